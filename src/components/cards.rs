use tui::buffer::Buffer;
use tui::layout::{Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::widgets::{Block, BorderType, Borders, Widget};

/// A headline number with a title and a one-line caption.
pub struct StatCard<'a> {
    pub title: &'a str,
    pub value: String,
    pub caption: &'a str,
    pub color: Color,
}

impl<'a> StatCard<'a> {
    pub fn new(title: &'a str, value: impl ToString, caption: &'a str) -> Self {
        Self {
            title,
            value: value.to_string(),
            caption,
            color: Color::White,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl Widget for StatCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" {} ", self.title));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let value_style = Style::default().fg(self.color).add_modifier(Modifier::BOLD);
        render_clipped(&self.value, inner.x, inner.y, inner.width, value_style, buf);
        if inner.height > 1 {
            let caption_style = Style::default().fg(Color::DarkGray);
            render_clipped(self.caption, inner.x, inner.y + 1, inner.width, caption_style, buf);
        }
    }
}

/// Render `cards` side by side across `area`.
pub fn render_cards(cards: Vec<StatCard>, area: Rect, buf: &mut Buffer) {
    if cards.is_empty() {
        return;
    }
    let n = cards.len() as u32;
    let slots = Layout::horizontal(vec![Constraint::Ratio(1, n); cards.len()]).split(area);
    for (card, slot) in cards.into_iter().zip(slots.iter()) {
        card.render(*slot, buf);
    }
}

fn render_clipped(text: &str, x: u16, y: u16, max_width: u16, style: Style, buf: &mut Buffer) {
    let clipped: String = text.chars().take(max_width as usize).collect();
    if !clipped.is_empty() {
        buf.set_string(x, y, clipped, style);
    }
}
