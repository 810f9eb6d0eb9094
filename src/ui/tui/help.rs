use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Draws the help overlay on the terminal frame.
pub fn draw_help_overlay(f: &mut Frame<'_>) {
    let size = f.size();

    let block = Block::default()
        .title("Help - Sniffle Controls")
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Yellow));

    let text = Paragraph::new(
        "Keyboard Controls:\n\
         q, Ctrl+C  - Quit\n\
         s, Space   - Start / stop capture\n\
         /          - Edit BPF filter (Up/Down: suggestions)\n\
         i          - Select interface\n\
         x          - Clear packet list\n\
         Up/Down    - Move selection (packets or layers)\n\
         PgUp/PgDn  - Move ten rows\n\
         Home/End   - First packet / follow newest\n\
         Tab        - Switch between packets and layers\n\
         Left/Right - Previous / next layer\n\
         ?          - Toggle help\n\
         Esc        - Cancel or return\n",
    )
    .block(block)
    .wrap(Wrap { trim: false });

    let area = centered(size, 60, 60);

    f.render_widget(Clear, area);
    f.render_widget(text, area);
}

/// A rectangle of the given percentage size centered in `outer`.
pub fn centered(outer: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let width = (u32::from(outer.width) * u32::from(percent_x.min(100)) / 100) as u16;
    let height = (u32::from(outer.height) * u32::from(percent_y.min(100)) / 100) as u16;
    Rect {
        x: outer.x + (outer.width - width) / 2,
        y: outer.y + (outer.height - height) / 2,
        width,
        height,
    }
}
