//! Text rendering of the terminal screen.
//!
//! Draws the same regions as the touchscreen (header, category tabs, product
//! grid, cart panel, payment overlay) as plain lines. Colour comes from the
//! [`Theme`] as 24-bit ANSI escapes when enabled.

use posterm_core::display::{item_count_label, Rgb};
use posterm_core::{format_amount, CategoryFilter, Layout, PaymentState, Theme};

use crate::app::TerminalApp;

/// Roughly how many pixels one monospace column stands for.
const PX_PER_COLUMN: u32 = 8;

pub(crate) struct Renderer {
    layout: Layout,
    theme: Theme,
    color: bool,
}

impl Renderer {
    pub(crate) fn new(layout: Layout, theme: Theme, color: bool) -> Self {
        Self {
            layout,
            theme,
            color,
        }
    }

    fn paint(&self, rgb: Rgb, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        let r = (rgb.0 >> 16) & 0xFF;
        let g = (rgb.0 >> 8) & 0xFF;
        let b = rgb.0 & 0xFF;
        format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m")
    }

    fn width(&self) -> usize {
        usize::try_from(self.layout.width / PX_PER_COLUMN).unwrap_or(40)
    }

    /// Renders the whole screen.
    pub(crate) fn draw(&self, app: &TerminalApp) -> String {
        let mut out = String::new();
        self.header(app, &mut out);
        self.categories(app, &mut out);
        self.products(app, &mut out);
        self.cart(app, &mut out);
        if let Some(overlay) = self.payment_overlay(app) {
            out.push_str(&overlay);
        }
        out
    }

    fn header(&self, app: &TerminalApp, out: &mut String) {
        let status = if !app.is_online() {
            "offline".to_string()
        } else if app.sync_in_flight() {
            "syncing".to_string()
        } else if app.last_sync_error().is_some() {
            format!("sync failed ({})", app.source())
        } else {
            app.source().to_string()
        };
        let rule = "=".repeat(self.width());
        push_line(out, &self.paint(self.theme.divider, &rule));
        let title = format!(
            "{}  [{}]",
            self.paint(self.theme.accent, app.business_name()),
            self.paint(self.theme.text_secondary, &status)
        );
        push_line(out, &title);
        push_line(out, &self.paint(self.theme.divider, &rule));
    }

    fn categories(&self, app: &TerminalApp, out: &mut String) {
        let session = app.session();
        let active = session.active_category();
        let mut tabs = vec![tab("all", "All", *active == CategoryFilter::All)];
        for category in session.catalog().categories() {
            let selected = active.as_id() == category.id;
            let label = format!("{} {}", category.icon, category.name);
            let text = tab(&category.id, &label, selected);
            let color = Rgb::parse(&category.display_color).unwrap_or(self.theme.bg_card);
            tabs.push(self.paint(color, &text));
        }
        push_line(out, &tabs.join(" "));
    }

    fn products(&self, app: &TerminalApp, out: &mut String) {
        let session = app.session();
        let products = session.visible_products();
        if products.is_empty() {
            push_line(out, &self.paint(self.theme.text_secondary, "  (no products)"));
            return;
        }

        let columns = usize::try_from(self.layout.product_columns()).unwrap_or(1);
        let cell_width = (self.width() / columns).max(12);
        for (row_index, row) in products.chunks(columns).enumerate() {
            let mut line = String::new();
            for (col, product) in row.iter().enumerate() {
                let position = row_index * columns + col + 1;
                let text = format!(
                    "{position:>2}. {} {}",
                    product.name,
                    format_amount(app.currency(), product.price)
                );
                let qty = session.cart().quantity_of(&product.id);
                let text = if qty > 0 {
                    format!("{text} x{qty}")
                } else {
                    text
                };
                let padded = format!("{text:<cell_width$}");
                let color = self.theme.product_color(product.display_color.as_deref());
                line.push_str(&self.paint(color, &padded));
            }
            push_line(out, line.trim_end());
        }
    }

    fn cart(&self, app: &TerminalApp, out: &mut String) {
        let session = app.session();
        let currency = app.currency();
        push_line(out, &self.paint(self.theme.divider, &"-".repeat(self.width())));

        if session.cart().is_empty() {
            push_line(out, &self.paint(self.theme.text_secondary, "Tap items to add"));
            return;
        }

        for (index, line) in session.cart().lines().iter().enumerate() {
            let row = format!(
                "{:>2}. {}x {:<18} {}",
                index + 1,
                line.quantity,
                line.name,
                format_amount(currency, line.line_total())
            );
            push_line(out, &row);
        }

        let summary = session.summary();
        if self.layout.widescreen {
            let breakdown = session.tax_breakdown();
            push_line(
                out,
                &format!("Subtotal: {}", format_amount(currency, breakdown.subtotal)),
            );
            push_line(
                out,
                &format!("GST:      {}", format_amount(currency, breakdown.tax)),
            );
        }
        let total = format!("Total: {}", format_amount(currency, summary.total));
        let footer = format!(
            "{}  {}",
            self.paint(self.theme.text_secondary, &item_count_label(summary.item_count)),
            self.paint(self.theme.accent_green, &total)
        );
        push_line(out, &footer);
    }

    fn payment_overlay(&self, app: &TerminalApp) -> Option<String> {
        let currency = app.currency();
        let (color, lines) = match app.payment_state() {
            PaymentState::Idle => return None,
            PaymentState::AwaitingPayment { amount } => (
                self.theme.accent,
                vec![
                    format_amount(currency, amount),
                    "Present card".to_string(),
                    "(confirm / cancel)".to_string(),
                ],
            ),
            PaymentState::Approved { amount } => (
                self.theme.success,
                vec!["APPROVED".to_string(), format_amount(currency, amount)],
            ),
            PaymentState::Cancelled => (self.theme.danger, vec!["CANCELLED".to_string()]),
        };

        let width = self.width();
        let mut out = String::new();
        let border = format!("+{}+", "-".repeat(width.saturating_sub(2)));
        push_line(&mut out, &self.paint(color, &border));
        for line in lines {
            let inner = width.saturating_sub(2);
            push_line(&mut out, &self.paint(color, &format!("|{line:^inner$}|")));
        }
        push_line(&mut out, &self.paint(color, &border));
        Some(out)
    }
}

/// Appends `text` and a newline.
fn push_line(out: &mut String, text: &str) {
    out.push_str(text);
    out.push('\n');
}

fn tab(id: &str, label: &str, selected: bool) -> String {
    if selected {
        format!("[*{label}*]")
    } else {
        format!("[{label}]({id})")
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use posterm_core::{DemoDataset, ScreenProfile};
    use rust_decimal::Decimal;

    use super::*;
    use crate::app::{CatalogSource, TerminalSettings};
    use crate::events::TerminalEvent;

    fn app() -> TerminalApp {
        TerminalApp::new(
            DemoDataset::Coffee.catalog(),
            CatalogSource::Demo(DemoDataset::Coffee),
            TerminalSettings {
                business_name: "POS TERMINAL".to_string(),
                currency: "$".to_string(),
                tax_rate: Decimal::new(15, 2),
                sync_interval: Duration::from_secs(30),
                payment_simulation: Duration::from_secs(3),
                approval_dwell: Duration::from_secs(2),
                online: false,
            },
        )
    }

    fn plain(profile: ScreenProfile) -> Renderer {
        Renderer::new(Layout::for_profile(profile), Theme::dark(), false)
    }

    #[test]
    fn empty_cart_prompts_to_tap() {
        let screen = plain(ScreenProfile::Compact).draw(&app());
        assert!(screen.contains("POS TERMINAL"));
        assert!(screen.contains("[offline]"));
        assert!(screen.contains("Tap items to add"));
        assert!(screen.contains("Flat White $5.50"));
    }

    #[test]
    fn every_region_ends_its_lines() {
        let screen = plain(ScreenProfile::Compact).draw(&app());
        assert!(screen.ends_with("Tap items to add\n"));
        let lines: Vec<&str> = screen.lines().collect();
        assert_eq!(lines[0], lines[2], "header framed by rules");
        assert!(lines[0].chars().all(|c| c == '='));
        assert!(lines[1].starts_with("POS TERMINAL  [offline]"));
        assert!(lines.iter().all(|l| !l.is_empty()));
    }

    #[test]
    fn cart_shows_lines_count_and_total() {
        let mut app = app();
        let now = Instant::now();
        app.handle(TerminalEvent::Tap("p6".to_string()), now);
        let screen = plain(ScreenProfile::Compact).draw(&app);
        assert!(screen.contains("1x Espresso"));
        assert!(screen.contains("1 item"));
        assert!(screen.contains("Total: $4.60"));
        assert!(!screen.contains("Subtotal"));
    }

    #[test]
    fn widescreen_shows_tax_breakdown() {
        let mut app = app();
        app.handle(TerminalEvent::Tap("p6".to_string()), Instant::now());
        let screen = plain(ScreenProfile::Widescreen).draw(&app);
        assert!(screen.contains("Subtotal: $4.00"));
        assert!(screen.contains("GST:      $0.60"));
    }

    #[test]
    fn active_category_is_marked() {
        let mut app = app();
        app.handle(
            TerminalEvent::SelectCategory(Some("cat-4".to_string())),
            Instant::now(),
        );
        let screen = plain(ScreenProfile::Compact).draw(&app);
        assert!(screen.contains("Desserts*]"));
        assert!(screen.contains("[All](all)"));
        assert!(!screen.contains("Flat White"));
        assert!(screen.contains("Brownie"));
    }

    #[test]
    fn payment_overlay_shows_amount() {
        let mut app = app();
        let now = Instant::now();
        app.handle(TerminalEvent::Tap("p6".to_string()), now);
        app.handle(TerminalEvent::Pay, now);
        let screen = plain(ScreenProfile::Compact).draw(&app);
        assert!(screen.contains("Present card"));
        assert!(screen.contains("$4.60"));
    }

    #[test]
    fn color_output_uses_theme_escape_codes() {
        let renderer = Renderer::new(
            Layout::for_profile(ScreenProfile::Compact),
            Theme::dark(),
            true,
        );
        let screen = renderer.draw(&app());
        // accent #00D9FF
        assert!(screen.contains("\x1b[38;2;0;217;255mPOS TERMINAL"));
    }
}
