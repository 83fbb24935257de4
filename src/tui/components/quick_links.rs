//! Quick-link shortcuts on the home screen.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::quick_links::{LinkIcon, QuickLink};
use crate::tui::component::Component;

pub fn icon_glyph(icon: LinkIcon) -> &'static str {
    match icon {
        LinkIcon::Globe => "◎",
        LinkIcon::Apple => "◆",
        LinkIcon::Search => "⌕",
        LinkIcon::Code => "‹›",
        LinkIcon::Swift => "»",
    }
}

/// One row per link: `F1  ◆ Apple   https://www.apple.com`.
pub struct QuickLinkList<'a> {
    pub links: &'a [QuickLink],
    pub selected: Option<usize>,
    /// Screen rect of each rendered row, for click hit-testing.
    pub rows: Vec<Rect>,
}

impl<'a> QuickLinkList<'a> {
    pub fn new(links: &'a [QuickLink], selected: Option<usize>) -> Self {
        Self {
            links,
            selected,
            rows: Vec::new(),
        }
    }
}

impl Component for QuickLinkList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.rows.clear();
        let name_width = self.links.iter().map(|l| l.name.chars().count()).max().unwrap_or(0);

        for (i, link) in self.links.iter().enumerate() {
            let y = area.y + i as u16;
            if y >= area.y + area.height {
                break;
            }
            let row = Rect::new(area.x, y, area.width, 1);

            let key = if i < 9 { format!("F{}", i + 1) } else { "  ".to_string() };
            let base = if self.selected == Some(i) {
                Style::default().fg(Color::White).add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            let line = Line::from(vec![
                Span::styled(format!("{key:<3} "), base.fg(Color::DarkGray)),
                Span::styled(format!("{} ", icon_glyph(link.icon)), base.fg(Color::Cyan)),
                Span::styled(
                    format!("{:<width$}  ", link.name, width = name_width),
                    base.add_modifier(Modifier::BOLD),
                ),
                Span::styled(link.url.clone(), base.fg(Color::DarkGray)),
            ]);
            frame.render_widget(line, row);
            self.rows.push(row);
        }
    }
}
