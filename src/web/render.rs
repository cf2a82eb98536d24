//! Page rendering behind an injected interface so handlers never reach back
//! into the application wiring for a template engine.

use axum::response::Html;
use std::fmt::Write;

use crate::db::User;
use crate::entities::users::UserRole;
use crate::entities::{properties, rent_payments};

use super::flash::Flash;

/// Cross-page context: who is looking at the page and any pending notice.
pub struct PageContext {
    pub current_user: Option<User>,
    pub flash: Option<Flash>,
}

pub enum Page {
    Home { properties: Vec<properties::Model> },
    Register,
    Login,
    Profile { user: User },
    PropertyDetail { property: properties::Model },
    RentHistory { payments: Vec<rent_payments::Model> },
    OwnerDashboard { properties: Vec<properties::Model> },
    PropertyForm { property: Option<properties::Model> },
    PropertyPayments {
        property: properties::Model,
        payments: Vec<rent_payments::Model>,
    },
    AdminDashboard {
        users: Vec<User>,
        properties: Vec<properties::Model>,
    },
}

pub trait PageRenderer: Send + Sync {
    fn render(&self, ctx: &PageContext, page: &Page) -> Html<String>;
}

/// Minimal server-side HTML renderer. All dynamic text goes through
/// html-escape.
pub struct HtmlRenderer;

fn esc(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

fn attr(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).into_owned()
}

impl HtmlRenderer {
    fn nav(ctx: &PageContext) -> String {
        let mut nav = String::from(r#"<nav><a href="/">Home</a>"#);
        match &ctx.current_user {
            None => {
                nav.push_str(r#" <a href="/login">Login</a> <a href="/register">Register</a>"#);
            }
            Some(user) => {
                match user.role {
                    UserRole::Tenant => {
                        nav.push_str(r#" <a href="/rent-history">Rent history</a>"#);
                    }
                    UserRole::Owner => {
                        nav.push_str(r#" <a href="/owner/dashboard">Dashboard</a>"#);
                    }
                    UserRole::Admin => {
                        nav.push_str(r#" <a href="/admin/dashboard">Admin</a>"#);
                    }
                }
                let _ = write!(
                    nav,
                    r#" <a href="/profile">Profile</a> <a href="/logout">Logout ({})</a>"#,
                    esc(&user.full_name)
                );
            }
        }
        nav.push_str("</nav>");
        nav
    }

    fn layout(title: &str, ctx: &PageContext, body: &str) -> Html<String> {
        let mut page = String::with_capacity(body.len() + 512);
        let _ = write!(
            page,
            "<!doctype html><html><head><meta charset=\"utf-8\"><title>{} - Rentarr</title></head><body>",
            esc(title)
        );
        page.push_str(&Self::nav(ctx));
        if let Some(flash) = &ctx.flash {
            let _ = write!(
                page,
                r#"<div class="flash flash-{}">{}</div>"#,
                flash.level.as_str(),
                esc(&flash.message)
            );
        }
        let _ = write!(page, "<main><h1>{}</h1>{body}</main></body></html>", esc(title));
        Html(page)
    }

    fn property_card(property: &properties::Model) -> String {
        let mut card = String::from(r#"<article class="property">"#);
        let _ = write!(
            card,
            r#"<h2><a href="/properties/{}">{}</a></h2>"#,
            property.id,
            esc(&property.title)
        );
        if let Some(image) = &property.main_image_path {
            let _ = write!(card, r#"<img src="{}" alt="">"#, attr(image));
        }
        let _ = write!(
            card,
            "<p>{} &middot; {} &middot; {} / month &middot; {}</p></article>",
            esc(&property.location),
            property.property_type.as_str(),
            property.rent_amount,
            property.availability_status.as_str()
        );
        card
    }

    fn payment_rows(payments: &[rent_payments::Model]) -> String {
        let mut rows = String::from(
            "<table><tr><th>Month</th><th>Amount</th><th>Status</th><th>Paid at</th></tr>",
        );
        for payment in payments {
            let _ = write!(
                rows,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                payment.month,
                payment.amount,
                payment.status.as_str(),
                esc(payment.paid_at.as_deref().unwrap_or("-"))
            );
        }
        rows.push_str("</table>");
        rows
    }

    fn property_form(property: Option<&properties::Model>) -> String {
        let (action, title, description, location, rent) = match property {
            Some(p) => (
                format!("/owner/properties/{}/edit", p.id),
                attr(&p.title),
                esc(&p.description),
                attr(&p.location),
                p.rent_amount.to_string(),
            ),
            None => (
                "/owner/properties/new".to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
            ),
        };

        let mut form = format!(
            r#"<form method="post" action="{action}" enctype="multipart/form-data">
<label>Title <input name="title" value="{title}"></label>
<label>Description <textarea name="description">{description}</textarea></label>
<label>Location <input name="location" value="{location}"></label>
<label>Rent amount <input name="rent_amount" value="{rent}"></label>
<label>Type <select name="property_type"><option value="apartment">Apartment</option><option value="house">House</option></select></label>"#
        );

        if property.is_some() {
            form.push_str(
                r#"<label>Status <select name="availability_status"><option value="available">Available</option><option value="rented">Rented</option><option value="inactive">Inactive</option></select></label>"#,
            );
        }

        form.push_str(
            r#"<label>Image <input type="file" name="image"></label>
<button type="submit">Save</button></form>"#,
        );
        form
    }
}

impl PageRenderer for HtmlRenderer {
    #[allow(clippy::too_many_lines)]
    fn render(&self, ctx: &PageContext, page: &Page) -> Html<String> {
        match page {
            Page::Home { properties } => {
                let mut body = String::from(
                    r#"<form method="get" action="/">
<input name="location" placeholder="Location">
<input name="min_rent" placeholder="Min rent">
<input name="max_rent" placeholder="Max rent">
<select name="property_type"><option value="">Any</option><option value="apartment">Apartment</option><option value="house">House</option></select>
<button type="submit">Filter</button></form>"#,
                );
                for property in properties {
                    body.push_str(&Self::property_card(property));
                }
                Self::layout("Browse properties", ctx, &body)
            }

            Page::Register => Self::layout(
                "Register",
                ctx,
                r#"<form method="post" action="/register">
<label>Full name <input name="full_name"></label>
<label>Email <input name="email" type="email"></label>
<label>Phone <input name="phone"></label>
<label>Password <input name="password" type="password"></label>
<label>Role <select name="role"><option value="tenant">Tenant</option><option value="owner">Owner</option></select></label>
<button type="submit">Register</button></form>"#,
            ),

            Page::Login => Self::layout(
                "Login",
                ctx,
                r#"<form method="post" action="/login">
<label>Email <input name="email" type="email"></label>
<label>Password <input name="password" type="password"></label>
<button type="submit">Login</button></form>"#,
            ),

            Page::Profile { user } => {
                let body = format!(
                    r#"<form method="post" action="/profile">
<label>Full name <input name="full_name" value="{}"></label>
<label>Email <input value="{}" disabled></label>
<label>Phone <input name="phone" value="{}"></label>
<button type="submit">Update</button></form>"#,
                    attr(&user.full_name),
                    attr(&user.email),
                    attr(&user.phone)
                );
                Self::layout("Profile", ctx, &body)
            }

            Page::PropertyDetail { property } => {
                let mut body = Self::property_card(property);
                let _ = write!(body, "<p>{}</p>", esc(&property.description));
                Self::layout(&property.title, ctx, &body)
            }

            Page::RentHistory { payments } => {
                Self::layout("Rent history", ctx, &Self::payment_rows(payments))
            }

            Page::OwnerDashboard { properties } => {
                let mut body =
                    String::from(r#"<p><a href="/owner/properties/new">Add property</a></p>"#);
                for property in properties {
                    body.push_str(&Self::property_card(property));
                    let _ = write!(
                        body,
                        r#"<p><a href="/owner/properties/{id}/edit">Edit</a>
 <a href="/owner/properties/{id}/payments">Payments</a></p>
<form method="post" action="/owner/properties/{id}/delete"><button type="submit">Delete</button></form>"#,
                        id = property.id
                    );
                }
                Self::layout("Owner dashboard", ctx, &body)
            }

            Page::PropertyForm { property } => Self::layout(
                if property.is_some() {
                    "Edit property"
                } else {
                    "New property"
                },
                ctx,
                &Self::property_form(property.as_ref()),
            ),

            Page::PropertyPayments { property, payments } => {
                let mut body = Self::payment_rows(payments);
                let _ = write!(
                    body,
                    r#"<form method="post" action="/owner/properties/{}/payments">
<label>Tenant id <input name="tenant_id"></label>
<label>Month <input name="month" placeholder="YYYY-MM-01"></label>
<label>Amount <input name="amount"></label>
<label>Status <select name="status"><option value="pending">Pending</option><option value="paid">Paid</option></select></label>
<button type="submit">Record</button></form>"#,
                    property.id
                );
                Self::layout(&format!("Payments - {}", property.title), ctx, &body)
            }

            Page::AdminDashboard { users, properties } => {
                let mut body = String::from(
                    r#"<h2>Users</h2><form method="get" action="/admin/dashboard">
<input name="user_q" placeholder="Name or email">
<select name="user_role"><option value="">Any role</option><option value="tenant">Tenant</option><option value="owner">Owner</option><option value="admin">Admin</option></select>
<input name="property_location" placeholder="Property location">
<button type="submit">Filter</button></form>
<table><tr><th>Name</th><th>Email</th><th>Role</th><th></th></tr>"#,
                );
                for user in users {
                    let _ = write!(
                        body,
                        r#"<tr><td>{}</td><td>{}</td><td>{}</td><td><form method="post" action="/admin/users/{}/remove"><button type="submit">Remove</button></form></td></tr>"#,
                        esc(&user.full_name),
                        esc(&user.email),
                        user.role.as_str(),
                        user.id
                    );
                }
                body.push_str("</table><h2>Properties</h2>");
                for property in properties {
                    body.push_str(&Self::property_card(property));
                    let _ = write!(
                        body,
                        r#"<form method="post" action="/admin/properties/{}/remove"><button type="submit">Remove</button></form>"#,
                        property.id
                    );
                }
                Self::layout("Admin dashboard", ctx, &body)
            }
        }
    }
}
