use log::error;
use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{
    BarChart, Block, BorderType, Borders, Cell, Paragraph, Row, Table, Tabs, Wrap,
};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::cards::{StatCard, render_cards};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::{LayoutAreas, cards_and_body};
use bodega_api::analytics::{self, EventCounts, standings, top_performers, top_teams};
use bodega_api::{Event, Numeric, parse_date};

const TOP_N: usize = 5;

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        let tab = app.state.active_tab;
        if tab == MenuItem::Help {
            draw_help(f, layout.main);
        } else if tab == MenuItem::Search {
            draw_search(f, layout.main, app);
        } else if draw_page_fallback(f, layout.main, app, tab) {
            match tab {
                MenuItem::Overview => draw_overview(f, layout.main, app),
                MenuItem::Players => draw_players(f, layout.main, app),
                MenuItem::Teams => draw_teams(f, layout.main, app),
                MenuItem::Events => draw_events(f, layout.main, app),
                MenuItem::Matches => draw_matches(f, layout.main, app),
                MenuItem::Analytics => draw_analytics(f, layout.main, app),
                MenuItem::Search | MenuItem::Help => {}
            }
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });

    if let Err(e) = result {
        error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn header_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let titles: Vec<Line> = MenuItem::TABS
        .iter()
        .enumerate()
        .map(|(i, t)| Line::from(format!("{} {}", i + 1, t.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(app.state.active_tab.index().unwrap_or(0))
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let (health, health_color) = match &app.state.health {
        Some(h) if h.is_ok() => ("API ok", Color::Green),
        Some(_) => ("API down", Color::Red),
        None => ("API ?", Color::DarkGray),
    };
    let help = Paragraph::new(Line::from(vec![
        Span::styled(health, Style::default().fg(health_color)),
        Span::raw("  Help: ? "),
    ]))
    .alignment(Alignment::Right)
    .block(
        Block::default()
            .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
            .border_type(border_type),
    )
    .style(style);
    f.render_widget(help, tab_bar[1]);
}

/// Draws the loading or error state for a tab without data. Returns `true`
/// when the tab has data and should be drawn normally.
fn draw_page_fallback(f: &mut Frame, area: Rect, app: &App, tab: MenuItem) -> bool {
    if app.state.has_data(tab) {
        return true;
    }
    let msg = match app.state.errors.get(&tab) {
        Some(err) => format!("Failed to load {}.\n{err}\n\nPress r to retry.", tab.title()),
        None => format!("Loading {}...", tab.title().to_lowercase()),
    };
    draw_placeholder(f, area, &msg);
    false
}

fn page_block<'a>(app: &App, tab: MenuItem) -> Block<'a> {
    let mut block = default_border(Color::White).title(format!(" {} ", tab.title()));
    if let Some(at) = app.state.loaded_at.get(&tab) {
        block = block.title_bottom(Line::from(format!(" updated {at} ")).right_aligned());
    }
    if let Some(err) = app.state.errors.get(&tab) {
        block = block.title_bottom(
            Line::from(Span::styled(
                format!(" refresh failed: {err} "),
                Style::default().fg(Color::Red),
            ))
            .left_aligned(),
        );
    }
    block
}

fn num(n: &Numeric, precision: usize) -> String {
    format!("{n:.precision$}")
}

fn or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_string()
}

fn short_date(raw: &str) -> String {
    parse_date(raw)
        .map(|d| d.format("%b %d %Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn scrolled<T>(rows: Vec<T>, offset: u16) -> impl Iterator<Item = T> {
    rows.into_iter().skip(offset as usize)
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

fn draw_overview(f: &mut Frame, area: Rect, app: &App) {
    let Some(overview) = app.state.overview.as_ref() else {
        return;
    };
    let block = page_block(app, MenuItem::Overview);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let (cards, body) = cards_and_body(inner);
    render_cards(
        vec![
            StatCard::new("Total Events", overview.total_events, "Tournament and league events"),
            StatCard::new("Total Players", overview.total_players, "Registered players"),
            StatCard::new("Total Teams", overview.total_teams, "Competing teams"),
            StatCard::new(
                "Avg Performance",
                format!("{:.2}", overview.average_performance),
                "Mean performance score",
            )
            .color(Color::Cyan),
        ],
        cards,
        f.buffer_mut(),
    );

    draw_event_table(f, body, " Recent Events ", &overview.events, app.state.scroll_offset);
}

fn draw_event_table(f: &mut Frame, area: Rect, title: &str, events: &[Event], offset: u16) {
    let rows: Vec<Row> = events
        .iter()
        .map(|e| {
            let status = if e.is_active {
                Span::styled("active", Style::default().fg(Color::Green))
            } else {
                Span::styled("completed", Style::default().fg(Color::DarkGray))
            };
            Row::new(vec![
                Cell::from(e.name.clone()),
                Cell::from(or_dash(e.event_type.as_deref())),
                Cell::from(short_date(&e.start_date)),
                Cell::from(e.end_date.as_deref().map(short_date).unwrap_or_else(|| "-".into())),
                Cell::from(or_dash(e.location.as_deref())),
                Cell::from(Line::from(status)),
            ])
        })
        .collect();

    let table = Table::new(
        scrolled(rows, offset),
        [
            Constraint::Fill(3),
            Constraint::Length(11),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Fill(2),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new(vec!["Name", "Type", "Start", "End", "Location", "Status"]).style(header_style()),
    )
    .block(default_border(Color::DarkGray).title(title.to_string()));
    f.render_widget(table, area);
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

fn draw_players(f: &mut Frame, area: Rect, app: &App) {
    let Some(page) = app.state.players.as_ref() else {
        return;
    };
    let metric = app.state.metric;
    let block = page_block(app, MenuItem::Players);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let leader = top_performers(&page.performance, metric, 1)
        .first()
        .map(|p| format!("{} ({:.1})", p.gamertag, metric.of(p)))
        .unwrap_or_else(|| "-".into());

    let leader_title = format!("Top {}", metric.label());
    let (cards, body) = cards_and_body(inner);
    render_cards(
        vec![
            StatCard::new("Players", page.players.len(), "Registered players"),
            StatCard::new(
                "Avg Performance",
                format!("{:.2}", page.average_performance()),
                "League average",
            )
            .color(Color::Cyan),
            StatCard::new(&leader_title, leader, "m / M to change metric").color(Color::Green),
        ],
        cards,
        f.buffer_mut(),
    );

    let ranked = top_performers(&page.performance, metric, page.performance.len());
    let rows: Vec<Row> = ranked
        .iter()
        .enumerate()
        .map(|(i, p)| {
            Row::new(vec![
                format!("{}", i + 1),
                p.gamertag.clone(),
                or_dash(p.team_name.as_deref()),
                or_dash(p.position.as_deref()),
                num(&p.games_played, 0),
                num(&p.avg_points, 1),
                num(&p.avg_assists, 1),
                num(&p.avg_rebounds, 1),
                num(&p.avg_steals, 1),
                num(&p.avg_blocks, 1),
                num(&p.avg_performance_score, 1),
            ])
        })
        .collect();

    let table = Table::new(
        scrolled(rows, app.state.scroll_offset),
        [
            Constraint::Length(4),
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Length(8),
            Constraint::Length(4),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(6),
        ],
    )
    .header(
        Row::new(vec![
            "#", "Gamertag", "Team", "Pos", "GP", "PTS", "AST", "REB", "STL", "BLK", "PERF",
        ])
        .style(header_style()),
    )
    .block(default_border(Color::DarkGray).title(format!(" Ranked by {} ", metric.label())));
    f.render_widget(table, body);
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

fn draw_teams(f: &mut Frame, area: Rect, app: &App) {
    let Some(page) = app.state.teams.as_ref() else {
        return;
    };
    let block = page_block(app, MenuItem::Teams);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let best = top_teams(&page.performance, 1)
        .first()
        .map(|t| format!("{} ({:.1}%)", t.team_name, t.win_percentage.value()))
        .unwrap_or_else(|| "-".into());

    let (cards, body) = cards_and_body(inner);
    render_cards(
        vec![
            StatCard::new("Teams", page.teams.len(), "Competing teams"),
            StatCard::new(
                "Avg Win %",
                format!("{:.1}%", page.average_win_percentage()),
                "League average",
            )
            .color(Color::Cyan),
            StatCard::new("Best Record", best, "By win percentage").color(Color::Green),
        ],
        cards,
        f.buffer_mut(),
    );

    let region_of = |team_id: &str| {
        page.teams
            .iter()
            .find(|t| t.id == team_id)
            .and_then(|t| t.region.clone())
            .unwrap_or_else(|| "-".into())
    };

    let rows: Vec<Row> = standings(&page.performance)
        .into_iter()
        .map(|t| {
            Row::new(vec![
                t.team_name.clone(),
                region_of(&t.team_id),
                num(&t.total_matches, 0),
                num(&t.total_wins, 0),
                num(&t.total_losses, 0),
                format!("{:.1}%", t.computed_win_percentage()),
                num(&t.points_scored, 0),
                num(&t.points_allowed, 0),
                num(&t.average_points_scored, 1),
            ])
        })
        .collect();

    let table = Table::new(
        scrolled(rows, app.state.scroll_offset),
        [
            Constraint::Fill(2),
            Constraint::Fill(1),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(7),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(7),
        ],
    )
    .header(
        Row::new(vec!["Team", "Region", "GP", "W", "L", "Win %", "PF", "PA", "Avg PF"])
            .style(header_style()),
    )
    .block(default_border(Color::DarkGray).title(" Standings "));
    f.render_widget(table, body);
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

fn draw_events(f: &mut Frame, area: Rect, app: &App) {
    let Some(page) = app.state.events.as_ref() else {
        return;
    };
    let block = page_block(app, MenuItem::Events);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let EventCounts { total, active, completed, upcoming } = page.counts();
    let (cards, body) = cards_and_body(inner);
    render_cards(
        vec![
            StatCard::new("Total Events", total, "All events"),
            StatCard::new("Active", active, "Currently running").color(Color::Green),
            StatCard::new("Completed", completed, "Finished events"),
            StatCard::new("Upcoming", upcoming, "Scheduled next").color(Color::Cyan),
        ],
        cards,
        f.buffer_mut(),
    );

    let [all, next] =
        Layout::vertical([Constraint::Fill(2), Constraint::Fill(1)]).areas(body);
    draw_event_table(f, all, " All Events ", &page.events, app.state.scroll_offset);
    draw_event_table(f, next, " Upcoming ", &page.upcoming, 0);
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

fn draw_matches(f: &mut Frame, area: Rect, app: &App) {
    let Some(page) = app.state.matches.as_ref() else {
        return;
    };
    let block = page_block(app, MenuItem::Matches);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [all, next] = Layout::vertical([Constraint::Fill(2), Constraint::Fill(1)]).areas(inner);

    let to_rows = |matches: &[bodega_api::Match]| -> Vec<Row<'static>> {
        matches
            .iter()
            .map(|m| {
                Row::new(vec![
                    short_date(&m.match_date),
                    m.home_team_id.clone(),
                    m.away_team_id.clone(),
                    m.status.clone(),
                    or_dash(m.venue.as_deref()),
                ])
            })
            .collect()
    };
    let widths = [
        Constraint::Length(12),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Length(11),
        Constraint::Fill(1),
    ];
    let header = Row::new(vec!["Date", "Home", "Away", "Status", "Venue"]).style(header_style());

    f.render_widget(
        Table::new(scrolled(to_rows(&page.matches), app.state.scroll_offset), widths)
            .header(header.clone())
            .block(default_border(Color::DarkGray).title(" All Matches ")),
        all,
    );
    f.render_widget(
        Table::new(to_rows(&page.upcoming), widths)
            .header(header)
            .block(default_border(Color::DarkGray).title(" Upcoming ")),
        next,
    );
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

fn draw_analytics(f: &mut Frame, area: Rect, app: &App) {
    let Some(snapshot) = app.state.analytics.as_ref() else {
        return;
    };
    let metric = app.state.metric;
    let block = page_block(app, MenuItem::Analytics);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let (cards, body) = cards_and_body(inner);
    render_cards(
        vec![
            StatCard::new(
                "Avg Performance",
                format!("{:.2}", analytics::round2(snapshot.average_performance())),
                "League average",
            )
            .color(Color::Cyan),
            StatCard::new(
                "Avg Win %",
                format!("{:.1}%", snapshot.average_win_percentage()),
                "League average",
            ),
            StatCard::new("Active Events", snapshot.active_events(), "Currently running")
                .color(Color::Green),
        ],
        cards,
        f.buffer_mut(),
    );

    let [chart_area, teams_area] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(body);

    let top = top_performers(&snapshot.players, metric, TOP_N);
    let bars: Vec<(&str, u64)> = top
        .iter()
        .map(|p| (p.gamertag.as_str(), metric.of(p).max(0.0).round() as u64))
        .collect();
    let chart = BarChart::default()
        .block(default_border(Color::DarkGray).title(format!(" Top {} by {} ", TOP_N, metric.label())))
        .bar_width(9)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .data(bars.as_slice());
    f.render_widget(chart, chart_area);

    let rows: Vec<Row> = top_teams(&snapshot.teams, TOP_N)
        .into_iter()
        .map(|t| {
            Row::new(vec![
                t.team_name.clone(),
                format!("{:.0}-{:.0}", t.total_wins, t.total_losses),
                format!("{:.1}%", t.win_percentage.value()),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [Constraint::Fill(1), Constraint::Length(7), Constraint::Length(7)],
    )
    .header(Row::new(vec!["Team", "W-L", "Win %"]).style(header_style()))
    .block(default_border(Color::DarkGray).title(" Top Teams "));
    f.render_widget(table, teams_area);
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

fn draw_search(f: &mut Frame, area: Rect, app: &App) {
    let block = page_block(app, MenuItem::Search);
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.width == 0 || inner.height < 4 {
        return;
    }

    let [input_area, results_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(inner);

    let search = &app.state.search;
    let (input, input_style) = if search.composing {
        (format!("> {}_", search.input), Style::default().fg(Color::Yellow))
    } else if search.input.is_empty() {
        (
            "Press / or Enter to search players and teams. Esc cancels.".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (format!("> {}", search.input), Style::default().fg(Color::Gray))
    };
    let mode = if search.composing { "typing" } else { "idle" };
    f.render_widget(
        Paragraph::new(input)
            .style(input_style)
            .block(default_border(Color::DarkGray).title(format!(" {mode} "))),
        input_area,
    );

    let Some(results) = search.results.as_ref() else {
        if let Some(err) = app.state.errors.get(&MenuItem::Search) {
            draw_placeholder(f, results_area, &format!("Search failed.\n{err}"));
        }
        return;
    };

    if results.is_empty() {
        let query = search.query.as_deref().unwrap_or_default();
        draw_placeholder(f, results_area, &format!("No players or teams match \"{query}\"."));
        return;
    }

    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled(
        format!("Players ({})", results.players.len()),
        header_style(),
    )));
    for p in &results.players {
        lines.push(Line::from(vec![
            Span::raw(format!("  {}", p.gamertag)),
            Span::styled(
                format!("  {}  RP {:.0}", or_dash(p.team_name.as_deref()), p.player_rp),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Teams ({})", results.teams.len()),
        header_style(),
    )));
    for t in &results.teams {
        lines.push(Line::from(vec![
            Span::raw(format!("  {}", t.name)),
            Span::styled(
                format!("  {}", or_dash(t.region.as_deref())),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    f.render_widget(
        Paragraph::new(lines)
            .scroll((app.state.scroll_offset, 0))
            .block(default_border(Color::DarkGray).title(" Results ")),
        results_area,
    );
}

// ---------------------------------------------------------------------------
// Help, logs, spinner
// ---------------------------------------------------------------------------

fn draw_help(f: &mut Frame, area: Rect) {
    let keys = [
        ("1-7", "switch tab"),
        ("?", "this help (Esc to leave)"),
        ("r", "reload the current tab"),
        ("j / k", "scroll tables"),
        ("m / M", "cycle ranking metric (Players, Analytics)"),
        ("/ or Enter", "type a search (Search tab)"),
        ("f", "toggle full screen"),
        ("\"", "toggle log pane"),
        ("q / Ctrl-c", "quit"),
    ];
    let lines: Vec<Line> = keys
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{key:>12}  "), header_style()),
                Span::raw(*what),
            ])
        })
        .collect();
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(default_border(Color::White).title(" Help ")),
        area,
    );
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(logs, area);
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(2), 0, 1, 1)
    };
    f.render_widget(spinner, area);
}
