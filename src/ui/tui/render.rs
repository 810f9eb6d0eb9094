use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};
use sniffle::{CapturedPacket, EngineState};

use super::help::{centered, draw_help_overlay};
use super::state::{FilterEditor, Focus, UiMode};
use super::App;
use crate::ui::device::device_label;
use crate::ui::filter::FilterStatus;

pub fn draw(f: &mut Frame<'_>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),      // header
            Constraint::Min(8),         // packets + stats
            Constraint::Percentage(40), // layers + hex
            Constraint::Length(1),      // footer
        ])
        .split(f.size());

    draw_header(f, app, chunks[0]);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(78), Constraint::Percentage(22)])
        .split(chunks[1]);
    draw_packet_table(f, app, top[0]);
    draw_stats_panel(f, app, top[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[2]);
    let packet = app.selected_packet();
    draw_layers(f, app, packet, bottom[0]);
    draw_hex(f, app, packet, bottom[1]);

    draw_footer(f, app, chunks[3]);

    match &app.ui.mode {
        UiMode::Capture => {}
        UiMode::HelpOverlay => draw_help_overlay(f),
        UiMode::DeviceMenu { options, selected } => draw_device_menu(f, options, *selected),
        UiMode::FilterMenu(editor) => draw_filter_menu(f, editor),
    }

    if let Some(msg) = &app.ui.error_msg {
        draw_error(f, msg);
    }
}

fn draw_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let status = match app.engine.state() {
        EngineState::Running => Span::styled("● CAPTURING", Style::default().fg(Color::Red).bold()),
        EngineState::Stopping => Span::styled("◌ STOPPING", Style::default().fg(Color::Yellow)),
        EngineState::Idle => Span::styled("○ STOPPED", Style::default().fg(Color::DarkGray)),
    };

    let interface = app.interface.as_deref().unwrap_or("(none)");
    let filter = if app.filter.is_empty() { "(none)" } else { app.filter.as_str() };
    let captured = app.engine.session().map_or(0, |s| s.packets());

    let mut spans = vec![
        Span::styled(" Sniffle ", Style::default().fg(Color::Cyan).bold()),
        status,
        Span::raw(format!("  on {}  filter: {}  ", interface, filter)),
        Span::raw(format!("{} captured, {} shown", captured, app.buffer.len())),
    ];
    if let Some(info) = &app.ui.info_msg {
        spans.push(Span::styled(format!("  {}", info), Style::default().fg(Color::Green)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_packet_table(f: &mut Frame<'_>, app: &App, area: Rect) {
    let header = Row::new(["#", "Time", "Source", "Destination", "Proto", "Len", "Info"].map(|title| {
        Cell::from(title).style(Style::default().fg(Color::Cyan).bold())
    }));

    let visible = area.height.saturating_sub(3) as usize; // borders + header
    let total = app.buffer.len();
    let selected = app.ui.selected_index(&app.buffer);

    // keep the selected row on screen, pinned to the bottom when following
    let offset = match selected {
        Some(index) if index >= visible => index + 1 - visible,
        _ => 0,
    }
    .min(total.saturating_sub(visible));

    let rows: Vec<Row> = app
        .buffer
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(index, packet)| {
            let summary = packet.summary();
            let style = if Some(index) == selected {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(summary.sequence.to_string()),
                Cell::from(summary.elapsed_text()),
                Cell::from(endpoint(summary.source_text(), summary.src_port)),
                Cell::from(endpoint(summary.destination_text(), summary.dst_port)),
                Cell::from(summary.protocol.clone()).style(protocol_color(&summary.protocol)),
                Cell::from(summary.length.to_string()),
                Cell::from(summary.info.clone()),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(7),
            Constraint::Length(12),
            Constraint::Length(24),
            Constraint::Length(24),
            Constraint::Length(8),
            Constraint::Length(6),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(focused_block(" Packets ", app.ui.focus == Focus::Packets));

    f.render_widget(table, area);
}

fn draw_stats_panel(f: &mut Frame<'_>, app: &App, area: Rect) {
    let lines: Vec<Line> = if app.stats.is_empty() {
        vec![Line::from("No packets yet.")]
    } else {
        app.stats
            .sorted()
            .into_iter()
            .map(|(protocol, count)| {
                Line::from(vec![
                    Span::styled(format!("{:<10}", protocol), protocol_color(protocol)),
                    Span::raw(count.to_string()),
                ])
            })
            .collect()
    };

    let block = Paragraph::new(lines).block(
        Block::default()
            .title(" Live Packet Stats ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(block, area);
}

fn draw_layers(f: &mut Frame<'_>, app: &App, packet: Option<&CapturedPacket>, area: Rect) {
    let block = focused_block(" Layers ", app.ui.focus == Focus::Layers);

    let Some(packet) = packet else {
        let hint = Paragraph::new(" Select a packet with ↑↓ to inspect")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(hint, area);
        return;
    };

    let mut lines = Vec::new();
    for (index, layer) in packet.layers().enumerate() {
        let selected = index == app.ui.layer;
        let marker = if selected { "▾ " } else { "▸ " };
        let style = match (selected, layer.is_pseudo()) {
            (true, _) => Style::default().fg(Color::Yellow).bold(),
            (false, true) => Style::default().fg(Color::DarkGray),
            (false, false) => Style::default().fg(Color::Cyan),
        };
        lines.push(Line::from(Span::styled(format!("{}{}", marker, layer.label()), style)));

        if selected {
            for field in layer.fields() {
                lines.push(Line::from(vec![
                    Span::styled(format!("    {:<10} ", field.name), Style::default().fg(Color::Green)),
                    Span::raw(field.value.clone()),
                ]));
            }
        }
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_hex(f: &mut Frame<'_>, app: &App, packet: Option<&CapturedPacket>, area: Rect) {
    let (title, dump) = match packet {
        Some(packet) => match packet.layers().nth(app.ui.layer) {
            Some(layer) => (format!(" Hex: {} ({} bytes) ", layer.label(), layer.bytes().len()), layer.hexdump()),
            None => (format!(" Hex: frame ({} bytes) ", packet.len()), packet.hexdump()),
        },
        None => (" Hex ".to_string(), String::new()),
    };

    let hex = Paragraph::new(dump).style(Style::default().fg(Color::Green)).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(hex, area);
}

fn draw_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let capture_key = if app.is_capturing() { ":Stop  " } else { ":Start  " };
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow).bold());

    let mut spans = vec![
        key(" q"),
        Span::raw(":Quit  "),
        key("s"),
        Span::raw(capture_key),
        key("/"),
        Span::raw(":Filter  "),
        key("i"),
        Span::raw(":Interface  "),
        key("Tab"),
        Span::raw(":Focus  "),
        key("←→"),
        Span::raw(":Layer  "),
        key("?"),
        Span::raw(":Help"),
    ];
    if app.ui.follow {
        spans.push(Span::styled(" [FOLLOW]", Style::default().fg(Color::Green).bold()));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_device_menu(f: &mut Frame<'_>, options: &[sniffle::InterfaceInfo], selected: usize) {
    let items: Vec<ListItem> = options.iter().map(|d| ListItem::new(device_label(d))).collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title("Select Interface (Enter to capture, Esc to cancel)")
                .borders(Borders::ALL),
        )
        .highlight_style(Style::default().fg(Color::Yellow).bg(Color::Blue));

    let mut state = ListState::default();
    state.select(Some(selected));

    let area = centered(f.size(), 60, 50);
    f.render_widget(Clear, area);
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_filter_menu(f: &mut Frame<'_>, editor: &FilterEditor) {
    let area = centered(f.size(), 70, 60);
    f.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    let color = if editor.status.is_valid() { Color::Green } else { Color::Red };
    let input = Paragraph::new(editor.input.as_str()).style(Style::default().fg(color)).block(
        Block::default()
            .title("BPF Filter (Enter to apply, Esc to cancel)")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    );
    f.render_widget(input, chunks[0]);

    let status = match &editor.status {
        FilterStatus::Valid => Span::styled(" valid", Style::default().fg(Color::Green)),
        FilterStatus::Invalid(reason) => Span::styled(format!(" {}", reason), Style::default().fg(Color::Red)),
    };
    f.render_widget(Paragraph::new(Line::from(status)), chunks[1]);

    let items: Vec<ListItem> = editor
        .options
        .iter()
        .map(|(label, expression)| {
            let expression = if expression.is_empty() { "(no filter)" } else { expression };
            ListItem::new(format!("{:<40} {}", label, expression))
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().title("Suggestions (Up/Down)").borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Yellow).bg(Color::Blue));
    let mut state = ListState::default();
    state.select(editor.selected);
    f.render_stateful_widget(list, chunks[2], &mut state);

    // cursor inside the input box, after the border
    let cursor_x = chunks[0].x + 1 + editor.cursor_pos as u16;
    if cursor_x < chunks[0].right().saturating_sub(1) {
        f.set_cursor(cursor_x, chunks[0].y + 1);
    }
}

fn draw_error(f: &mut Frame<'_>, msg: &str) {
    let size = f.size();
    let area = Rect {
        x: 5.min(size.width),
        y: 2.min(size.height),
        width: size.width.saturating_sub(10),
        height: 3.min(size.height.saturating_sub(2)),
    };

    let block = Paragraph::new(msg.to_string())
        .block(Block::default().title("Error").borders(Borders::ALL))
        .style(Style::default().fg(Color::Red));

    f.render_widget(Clear, area);
    f.render_widget(block, area);
}

fn focused_block(title: &'static str, focused: bool) -> Block<'static> {
    let color = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
}

fn endpoint(addr: String, port: Option<u16>) -> String {
    match port {
        Some(port) => format!("{}:{}", addr, port),
        None => addr,
    }
}

fn protocol_color(protocol: &str) -> Style {
    let color = match protocol {
        "TCP" => Color::Magenta,
        "UDP" | "DNS" => Color::Blue,
        "ICMP" | "ICMPv6" => Color::Yellow,
        "ARP" => Color::LightRed,
        "IPv4" | "IPv6" => Color::Green,
        _ => Color::White,
    };
    Style::default().fg(color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use sniffle::{CaptureConfig, CaptureEngine, DisplayBuffer};
    use std::time::SystemTime;

    fn app_with_packets(count: u64) -> App {
        let (engine, _events) = CaptureEngine::new(CaptureConfig::default());
        let mut app = App::new(engine, DisplayBuffer::new(), Some("eth0".into()), String::new());
        for sequence in 1..=count {
            let mut frame = vec![0xffu8; 12];
            frame.extend_from_slice(&[0x88, 0xb5, 0xaa]);
            app.buffer.insert(CapturedPacket::from_raw(frame, SystemTime::UNIX_EPOCH, sequence));
        }
        app
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_draws_every_mode() {
        let mut app = app_with_packets(50);
        assert!(render(&app).contains("Packets"));

        app.ui.mode = UiMode::HelpOverlay;
        assert!(render(&app).contains("Sniffle Controls"));

        app.ui.mode = UiMode::FilterMenu(FilterEditor::new("tcp port", false));
        assert!(render(&app).contains("BPF Filter"));

        app.ui.mode = UiMode::DeviceMenu {
            options: vec![sniffle::InterfaceInfo {
                name: "eth0".into(),
                description: None,
                loopback: false,
            }],
            selected: 0,
        };
        assert!(render(&app).contains("Select Interface"));
    }

    #[test]
    fn test_selected_packet_layers_shown() {
        let app = app_with_packets(3);
        let screen = render(&app);
        assert!(screen.contains("Ethernet"));
        assert!(screen.contains("Hex: Ethernet"));
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let app = app_with_packets(5);
        let mut terminal = Terminal::new(TestBackend::new(10, 4)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();
    }
}
