// src/format.rs
//! Renders the ranked deals into one Threads post.

use chrono::{Local, NaiveDate};

use crate::ingest::types::Deal;

/// Threads rejects text posts longer than this (Unicode scalar values).
pub const MAX_POST_CHARS: usize = 500;
/// Deals rendered per post.
pub const TOP_DEALS: usize = 5;

const SEPARATOR_WIDTH: usize = 30;
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPost {
    pub text: String,
    pub deal_count: usize,
    /// Deals whose title line is still in `text` after truncation.
    pub shown_deals: usize,
    pub truncated: bool,
}

pub fn rank_glyph(rank: usize) -> String {
    match rank {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        4 => "4️⃣".to_string(),
        5 => "5️⃣".to_string(),
        n => format!("{n}."),
    }
}

pub fn format_deal(deal: &Deal, rank: usize) -> String {
    let mut out = format!("{} {}\n💰 {}", rank_glyph(rank), deal.title, deal.price);
    if let Some(d) = &deal.discount {
        out.push_str(&format!(" ({d} OFF)"));
    }
    out.push_str(&format!("\n🏪 {}\n🔗 {}\n", deal.store, deal.link));
    out
}

fn separator() -> String {
    "─".repeat(SEPARATOR_WIDTH)
}

fn header(date: NaiveDate) -> String {
    format!(
        "🔥 TODAY'S HOTTEST DEALS 🔥\n📅 {}\n{}\n\n",
        date.format("%B %d, %Y"),
        separator()
    )
}

fn footer() -> String {
    format!(
        "\n{}\n💡 Follow for daily deals!\n#deals #savings #shopping #discounts",
        separator()
    )
}

/// Render today's post from the first [`TOP_DEALS`] deals.
pub fn render_post(deals: &[Deal]) -> RenderedPost {
    render_post_on(deals, Local::now().date_naive())
}

/// Render with an explicit date. The footer always survives; when the post
/// is over [`MAX_POST_CHARS`] the header/body is cut and `...` appended.
pub fn render_post_on(deals: &[Deal], date: NaiveDate) -> RenderedPost {
    let top = &deals[..deals.len().min(TOP_DEALS)];

    let mut body = header(date);
    let mut title_ends = Vec::with_capacity(top.len());
    for (i, deal) in top.iter().enumerate() {
        if i > 0 {
            body.push('\n');
        }
        let block = format_deal(deal, i + 1);
        let title_len = block.lines().next().map_or(0, |l| l.chars().count());
        title_ends.push(body.chars().count() + title_len);
        body.push_str(&block);
    }
    let footer = footer();

    let body_len = body.chars().count();
    let footer_len = footer.chars().count();

    if body_len + footer_len <= MAX_POST_CHARS {
        body.push_str(&footer);
        return RenderedPost {
            text: body,
            deal_count: top.len(),
            shown_deals: top.len(),
            truncated: false,
        };
    }

    let ellipsis_len = ELLIPSIS.chars().count();
    let (text, kept) = match MAX_POST_CHARS.checked_sub(footer_len + ellipsis_len) {
        Some(keep) => {
            let cut: String = body.chars().take(keep).collect();
            (format!("{cut}{ELLIPSIS}{footer}"), keep)
        }
        // Footer alone does not fit; cut the whole text instead.
        None => {
            let whole = format!("{body}{footer}");
            let cut: String = whole
                .chars()
                .take(MAX_POST_CHARS.saturating_sub(ellipsis_len))
                .collect();
            let kept = MAX_POST_CHARS.saturating_sub(ellipsis_len);
            (format!("{cut}{ELLIPSIS}"), kept)
        }
    };

    RenderedPost {
        text,
        deal_count: top.len(),
        shown_deals: title_ends.iter().filter(|&&end| end <= kept).count(),
        truncated: true,
    }
}
