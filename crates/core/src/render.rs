//! HTML fragments for the admin reports screens.
//!
//! The admin UI swaps these fragments into place after each AJAX refresh,
//! so markup and class names are part of the contract with the front end.

use crate::activity::ActivityItem;
use crate::donors::DonorSummary;
use crate::money::CurrencyFormat;
use crate::pagination::{PageLink, Pagination};
use crate::report_args::{DateRange, ReportType};
use crate::reports::{ComparisonWindows, LybuntReport, PaymentBreakdown, TopDonor};
use crate::types::Timestamp;

/// Message shown when a report has nothing to display.
pub const NO_DATA_MESSAGE: &str = "No data found for the selected date range.";

const DATE_DISPLAY_FORMAT: &str = "%B %-d, %Y";

pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn display_date(ts: Option<Timestamp>) -> String {
    ts.map(|t| t.format(DATE_DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| "&mdash;".to_string())
}

pub fn no_data() -> String {
    format!(
        "<div class=\"charitable-report-no-data\"><p>{}</p></div>",
        escape_html(NO_DATA_MESSAGE)
    )
}

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

pub fn activity_list(items: &[ActivityItem]) -> String {
    if items.is_empty() {
        return no_data();
    }

    let mut html = String::from("<ul class=\"charitable-activity-list\">\n");
    for item in items {
        html.push_str(&format!(
            "<li class=\"charitable-activity-item charitable-activity-{}\">",
            item.icon
        ));
        html.push_str(&format!(
            "<span class=\"charitable-activity-icon charitable-icon-{}\"></span>",
            item.icon
        ));
        html.push_str(&format!(
            "<span class=\"charitable-activity-label\">{}</span>",
            escape_html(&item.label)
        ));
        if let Some(amount) = &item.formatted_amount {
            html.push_str(&format!(
                "<span class=\"charitable-activity-amount\">{}</span>",
                escape_html(amount)
            ));
        }
        if let Some(donor) = &item.donor_name {
            html.push_str(&format!(
                "<span class=\"charitable-activity-donor\">{}</span>",
                escape_html(donor)
            ));
        }
        if let Some(campaign) = &item.campaign_title {
            html.push_str(&format!(
                "<span class=\"charitable-activity-campaign\">{}</span>",
                escape_html(campaign)
            ));
        }
        html.push_str(&format!(
            "<time datetime=\"{}\">{}</time>",
            item.date_recorded.to_rfc3339(),
            display_date(Some(item.date_recorded))
        ));
        html.push_str("</li>\n");
    }
    html.push_str("</ul>");
    html
}

// ---------------------------------------------------------------------------
// Donors
// ---------------------------------------------------------------------------

pub fn donor_table(rows: &[DonorSummary], format: &CurrencyFormat) -> String {
    if rows.is_empty() {
        return no_data();
    }

    let mut html = String::from(
        "<table class=\"charitable-report-table charitable-donor-table\">\n<thead><tr>\
         <th>Name</th><th>Email</th><th>Total Donated</th><th>Donations</th>\
         <th>Average</th><th>First Donation</th><th>Last Donation</th>\
         </tr></thead>\n<tbody>\n",
    );
    for row in rows {
        html.push_str(&format!(
            "<tr data-donor-id=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            row.donor_id,
            escape_html(&row.name),
            escape_html(&row.email),
            escape_html(&format.format(row.total_amount)),
            row.donation_count,
            escape_html(&format.format(row.average_amount)),
            display_date(row.first_donation_date),
            display_date(row.last_donation_date),
        ));
    }
    html.push_str("</tbody>\n</table>");
    html
}

pub fn top_donors(rows: &[TopDonor], format: &CurrencyFormat) -> String {
    if rows.is_empty() {
        return no_data();
    }

    let mut html = String::from("<ol class=\"charitable-top-donors\">\n");
    for row in rows {
        html.push_str(&format!(
            "<li data-donor-id=\"{}\"><span class=\"charitable-top-donor-name\">{}</span>\
             <span class=\"charitable-top-donor-amount\">{}</span>\
             <span class=\"charitable-top-donor-count\">{} donation{}</span></li>\n",
            row.donor_id,
            escape_html(&row.name),
            escape_html(&format.format(row.total_amount)),
            row.donation_count,
            if row.donation_count == 1 { "" } else { "s" },
        ));
    }
    html.push_str("</ol>");
    html
}

// ---------------------------------------------------------------------------
// Payment methods
// ---------------------------------------------------------------------------

pub fn payment_methods(breakdown: &PaymentBreakdown, format: &CurrencyFormat) -> String {
    if breakdown.rows.is_empty() {
        return no_data();
    }

    let mut html = String::from(
        "<table class=\"charitable-report-table charitable-payment-methods\">\n<thead><tr>\
         <th>Payment Method</th><th>Donations</th><th>Amount</th><th>Share</th>\
         </tr></thead>\n<tbody>\n",
    );
    for row in &breakdown.rows {
        html.push_str(&format!(
            "<tr data-gateway=\"{}\"><td>{}</td><td>{}</td><td>{}</td>\
             <td><span class=\"charitable-percent-bar\" style=\"width: {:.2}%\"></span>{:.2}%</td></tr>\n",
            escape_html(&row.gateway),
            escape_html(&row.label),
            row.count,
            escape_html(&format.format(row.amount)),
            row.amount_pct,
            row.amount_pct,
        ));
    }
    html.push_str(&format!(
        "</tbody>\n<tfoot><tr><th>Total</th><th>{}</th><th>{}</th><th>100%</th></tr></tfoot>\n</table>",
        breakdown.total_count,
        escape_html(&format.format(breakdown.total_amount)),
    ));
    html
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

pub fn pagination(p: &Pagination, report_type: ReportType) -> String {
    if p.total_pages <= 1 {
        return String::new();
    }

    let mut html = format!(
        "<nav class=\"charitable-report-pagination\" data-report-type=\"{}\">",
        report_type
    );
    if let Some(prev) = p.prev {
        html.push_str(&format!(
            "<a href=\"#\" class=\"prev-page\" data-page=\"{prev}\">&lsaquo;</a>"
        ));
    }
    for link in &p.links {
        match link {
            PageLink::Page { number, current: true } => html.push_str(&format!(
                "<span class=\"page-number current\" aria-current=\"page\">{number}</span>"
            )),
            PageLink::Page { number, current: false } => html.push_str(&format!(
                "<a href=\"#\" class=\"page-number\" data-page=\"{number}\">{number}</a>"
            )),
            PageLink::Ellipsis => html.push_str("<span class=\"page-dots\">&hellip;</span>"),
        }
    }
    if let Some(next) = p.next {
        html.push_str(&format!(
            "<a href=\"#\" class=\"next-page\" data-page=\"{next}\">&rsaquo;</a>"
        ));
    }
    html.push_str("</nav>");
    html
}

// ---------------------------------------------------------------------------
// Advanced reports
// ---------------------------------------------------------------------------

/// Filter controls for the advanced report tab.
pub fn advanced_report_ui(report_type: ReportType, windows: &ComparisonWindows) -> String {
    let option = |value: ReportType, label: &str| {
        format!(
            "<option value=\"{}\"{}>{}</option>",
            value,
            if value == report_type { " selected" } else { "" },
            label
        )
    };
    let description = match report_type {
        ReportType::Sybunt => "Donors who gave in some earlier year but not this year.",
        _ => "Donors who gave last year but not this year.",
    };

    format!(
        "<form class=\"charitable-advanced-report-form\" data-report-type=\"{rt}\">\
         <select name=\"report_type\">{lybunt}{sybunt}</select>\
         <p class=\"description\">{description}</p>\
         <fieldset class=\"charitable-compare-window\">\
         <legend>Compare from</legend>\
         <input type=\"date\" name=\"compare_from_start\" value=\"{fs}\">\
         <input type=\"date\" name=\"compare_from_end\" value=\"{fe}\">\
         </fieldset>\
         <fieldset class=\"charitable-compare-window\">\
         <legend>Compare to</legend>\
         <input type=\"date\" name=\"compare_to_start\" value=\"{ts}\">\
         <input type=\"date\" name=\"compare_to_end\" value=\"{te}\">\
         </fieldset>\
         <select name=\"sort_by\">\
         <option value=\"lifetime_total\">Lifetime total</option>\
         <option value=\"last_donation_amount\">Last donation amount</option>\
         <option value=\"last_donation_date\">Last donation date</option>\
         <option value=\"name\">Name</option>\
         </select>\
         <button type=\"submit\" class=\"button\">Run report</button>\
         </form>",
        rt = report_type,
        lybunt = option(ReportType::Lybunt, "LYBUNT"),
        sybunt = option(ReportType::Sybunt, "SYBUNT"),
        fs = windows.compare_from.start,
        fe = windows.compare_from.end,
        ts = windows.compare_to.start,
        te = windows.compare_to.end,
    )
}

pub fn lybunt_table(report: &LybuntReport, format: &CurrencyFormat) -> String {
    if report.rows.is_empty() {
        return no_data();
    }

    let mut html = String::from(
        "<table class=\"charitable-report-table charitable-lybunt-table\">\n<thead><tr>\
         <th>Name</th><th>Email</th><th>Last Donation</th><th>Last Donation Date</th>\
         <th>Last Campaign</th><th>Lifetime Total</th>\
         </tr></thead>\n<tbody>\n",
    );
    for row in &report.rows {
        html.push_str(&format!(
            "<tr data-donor-id=\"{}\"{}><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            row.donor_id,
            if row.lapsed { " class=\"lapsed\"" } else { "" },
            escape_html(&row.name),
            escape_html(&row.email),
            escape_html(&format.format(row.last_donation_amount)),
            display_date(row.last_donation_date),
            escape_html(row.last_campaign.as_deref().unwrap_or("")),
            escape_html(&format.format(row.lifetime_total)),
        ));
    }
    html.push_str("</tbody>\n</table>");
    html
}

// ---------------------------------------------------------------------------
// Print view
// ---------------------------------------------------------------------------

/// A standalone printable HTML document holding one table.
pub fn print_document(
    title: &str,
    range: &DateRange,
    headers: &[&str],
    rows: &[Vec<String>],
) -> String {
    let mut html =
        String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    html.push_str(
        "<style>body{font-family:sans-serif;margin:2em;color:#1d2327}\
         table{border-collapse:collapse;width:100%}\
         th,td{border:1px solid #c3c4c7;padding:6px 8px;text-align:left}\
         th{background:#f6f7f7}\
         @media print{.no-print{display:none}}</style>\n",
    );
    html.push_str("</head>\n<body onload=\"window.print()\">\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(title)));
    html.push_str(&format!(
        "<p class=\"charitable-print-range\">{} &ndash; {}</p>\n",
        range.start.format(DATE_DISPLAY_FORMAT),
        range.end.format(DATE_DISPLAY_FORMAT)
    ));

    if rows.is_empty() {
        html.push_str(&no_data());
        html.push_str("\n</body>\n</html>\n");
        return html;
    }

    html.push_str("<table>\n<thead><tr>");
    for header in headers {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}
