//! Portal page routes.
//!
//! Server-rendered HTML shells with inline CSS — no JS framework. The page
//! bodies are deliberately inert: everything interesting happens in the
//! gating middleware and the core crates, and these handlers only render
//! what the gate lets through. The loading shell and maintenance splash
//! rendered *by* the gate live here too, next to the pages they replace.

use std::sync::Arc;

use axum::Router;
use axum::response::Html;
use axum::routing::get;

use crate::state::AppState;

/// Public pages: the landing page and the admin landing.
pub fn public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(landing_page))
        .route("/superadmin", get(superadmin_landing_page))
}

/// Session-guarded application pages.
pub fn app_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard", get(dashboard_page))
        .route("/tools", get(tools_page))
        .route("/settings", get(settings_page))
        .route("/billing", get(billing_page))
        .route("/affiliate", get(affiliate_page))
}

/// Session-guarded admin panel pages. Maintenance-exempt by path prefix.
pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/superadmin/dashboard", get(superadmin_dashboard_page))
        .route("/superadmin/maintenance", get(superadmin_maintenance_page))
}

async fn landing_page() -> Html<String> {
    Html(page_shell("Vestibule", LANDING_CONTENT))
}

async fn dashboard_page() -> Html<String> {
    Html(page_shell("Dashboard", DASHBOARD_CONTENT))
}

async fn tools_page() -> Html<String> {
    Html(page_shell("Content Tools", TOOLS_CONTENT))
}

async fn settings_page() -> Html<String> {
    Html(page_shell("Settings", SETTINGS_CONTENT))
}

async fn billing_page() -> Html<String> {
    Html(page_shell("Billing", BILLING_CONTENT))
}

async fn affiliate_page() -> Html<String> {
    Html(page_shell("Affiliate Program", AFFILIATE_CONTENT))
}

async fn superadmin_landing_page() -> Html<String> {
    Html(page_shell("Super Admin", SUPERADMIN_CONTENT))
}

async fn superadmin_dashboard_page() -> Html<String> {
    Html(page_shell("Super Admin — Dashboard", SUPERADMIN_DASHBOARD_CONTENT))
}

async fn superadmin_maintenance_page() -> Html<String> {
    Html(page_shell("Super Admin — Maintenance", SUPERADMIN_MAINTENANCE_CONTENT))
}

/// Transient shell served while the store has not finished its initial
/// read. Carries no page content.
#[must_use]
pub fn loading_shell() -> String {
    page_shell("Loading", LOADING_CONTENT)
}

/// The maintenance splash, carrying the stored message.
#[must_use]
pub fn maintenance_splash(message: &str) -> String {
    let body = format!(
        "<section class=\"notice\">\n<h1>Scheduled maintenance</h1>\n<p class=\"message\">{}</p>\n</section>",
        escape_html(message)
    );
    page_shell("Maintenance", &body)
}

/// Minimal HTML escaping for text interpolated into a page.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render a page into the shared shell.
fn page_shell(title: &str, content: &str) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>");
    html.push_str(&escape_html(title));
    html.push_str(" · Vestibule</title>\n<style>");
    html.push_str(PAGE_CSS);
    html.push_str("</style>\n</head>\n<body>\n<nav>");
    html.push_str(NAV_LINKS);
    html.push_str("</nav>\n<main>\n");
    html.push_str(content);
    html.push_str("\n</main>\n</body>\n</html>");
    html
}

const PAGE_CSS: &str = "body{margin:0;font-family:system-ui,sans-serif;color:#1b1b1f;background:#fafafa}\
nav{display:flex;gap:1.25rem;padding:1rem 2rem;background:#fff;border-bottom:1px solid #e4e4e9}\
nav a{color:#1b1b1f;text-decoration:none;font-weight:500}\
main{max-width:52rem;margin:3rem auto;padding:0 2rem}\
h1{font-size:1.6rem;margin-bottom:.5rem}\
p{line-height:1.6;color:#44444c}\
.notice{text-align:center;margin-top:6rem}\
.notice .message{font-size:1.1rem}";

const NAV_LINKS: &str = "<a href=\"/\">Vestibule</a><a href=\"/dashboard\">Dashboard</a>\
<a href=\"/tools\">Tools</a><a href=\"/settings\">Settings</a>\
<a href=\"/billing\">Billing</a><a href=\"/affiliate\">Affiliate</a>";

const LANDING_CONTENT: &str = "<h1>Marketing content, on schedule</h1>\n\
<p>Vestibule is the front door to your content platform: plan campaigns, \
generate copy, and publish everywhere from one place.</p>\n\
<p>Sign in to reach your dashboard.</p>";

const DASHBOARD_CONTENT: &str = "<h1>Dashboard</h1>\n\
<p>Campaign overview, recent generations, and publishing activity.</p>";

const TOOLS_CONTENT: &str = "<h1>Content tools</h1>\n\
<p>Copy generator, headline variants, and the social calendar.</p>";

const SETTINGS_CONTENT: &str = "<h1>Settings</h1>\n\
<p>Workspace profile, brand voice, and connected accounts.</p>";

const BILLING_CONTENT: &str = "<h1>Billing</h1>\n\
<p>Plan, invoices, and usage for the current cycle.</p>";

const AFFILIATE_CONTENT: &str = "<h1>Affiliate program</h1>\n\
<p>Your referral link, conversions, and payouts.</p>";

const SUPERADMIN_CONTENT: &str = "<h1>Super admin</h1>\n\
<p>Operations entry point. Sign in with an operator account to continue.</p>";

const SUPERADMIN_DASHBOARD_CONTENT: &str = "<h1>Platform dashboard</h1>\n\
<p>Tenant counts, generation volume, and upstream health.</p>";

const SUPERADMIN_MAINTENANCE_CONTENT: &str = "<h1>Maintenance mode</h1>\n\
<p>Toggle platform-wide maintenance and edit the viewer-facing message via \
<code>PUT /superadmin/api/maintenance</code>.</p>";

const LOADING_CONTENT: &str = "<section class=\"notice\">\n<h1>Loading…</h1>\n\
<p>The portal is starting up. This page refreshes in a moment.</p>\n</section>";
