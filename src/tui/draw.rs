use crate::analysis::summary::{NodeRisk, NodeSummary, summarize_database, summarize_nodes};
use crate::analysis::trend::{Trend, history_trend, success_ratio};
use crate::geometry::rect::Rect as WorldRect;
use crate::simulation::engine::Simulation;
use crate::state::request::RequestStatus;
use crate::topology::topology::{DATABASE_RECT, TopologyKind, WORLD_HEIGHT, WORLD_WIDTH};
use crate::tui::app::App;
use crate::tui::input::KEY_HINTS;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::Color::White;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Points, Rectangle};
use ratatui::widgets::{Block, Borders, Cell, Padding, Paragraph, Row, Sparkline, Table};
use std::collections::VecDeque;

const MONO_COLOR: Color = Color::Rgb(0, 180, 255);
const AUTH_COLOR: Color = Color::Rgb(200, 0, 255);
const ORDER_COLOR: Color = Color::Rgb(255, 140, 0);
const DB_COLOR: Color = Color::Rgb(140, 140, 150);
const ERROR_RED: Color = Color::Rgb(255, 50, 50);
const SUCCESS_GREEN: Color = Color::Rgb(0, 255, 100);
const DEAD_COLOR: Color = Color::DarkGray;

const TREND_WINDOW: usize = 30;

pub fn draw_app(frame: &mut Frame, app: &App) {
    let sim = app.controller.simulation();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(10),
            Constraint::Length(8),
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(50)])
        .split(chunks[2]);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[3]);

    frame.render_widget(build_header(app), chunks[0]);
    frame.render_widget(
        Paragraph::new(KEY_HINTS).style(Style::default().add_modifier(Modifier::DIM)),
        chunks[1],
    );
    draw_world(frame, sim, body[0]);
    frame.render_widget(build_node_table(sim), body[1]);

    let metrics = sim.metrics();
    let ratio = success_ratio(metrics.successes(), metrics.failures());
    let ok_title = match ratio {
        Some(r) => format!(" Success rate {} {:>3.0}% ", trend_arrow(metrics.successes()), r * 100.0),
        None => " Success rate ".to_string(),
    };
    let fail_title = format!(" Failure rate {} ", trend_arrow(metrics.failures()));
    frame.render_widget(
        build_sparkline(ok_title, metrics.successes(), SUCCESS_GREEN, charts[0]),
        charts[0],
    );
    frame.render_widget(
        build_sparkline(fail_title, metrics.failures(), ERROR_RED, charts[1]),
        charts[1],
    );
}

fn trend_arrow(history: &VecDeque<u32>) -> &'static str {
    match history_trend(history, TREND_WINDOW) {
        Trend::Up => "↗",
        Trend::Down => "↘",
        Trend::Flat => "→",
    }
}

fn node_color(kind: TopologyKind, index: usize, alive: bool) -> Color {
    if !alive {
        return DEAD_COLOR;
    }
    match (kind, index) {
        (TopologyKind::Monolith, _) => MONO_COLOR,
        (TopologyKind::Micro, 0) => AUTH_COLOR,
        (TopologyKind::Micro, _) => ORDER_COLOR,
    }
}

fn request_color(status: RequestStatus) -> Color {
    match status {
        RequestStatus::Failed => ERROR_RED,
        _ => Color::White,
    }
}

fn risk_style(risk: NodeRisk) -> Style {
    match risk {
        NodeRisk::Low => Style::default().fg(Color::Green),
        NodeRisk::Elevated => Style::default().fg(Color::Yellow),
        NodeRisk::Critical => Style::default().fg(Color::Red),
        NodeRisk::Down => Style::default().fg(DEAD_COLOR).add_modifier(Modifier::BOLD),
    }
}

fn build_header(app: &'_ App) -> Block<'_> {
    let sim = app.controller.simulation();
    let dim = Style::default().add_modifier(Modifier::DIM);
    let mut spans = vec![
        Span::raw(" archsim ").style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("|").style(dim),
        Span::raw(" Architecture: ").style(dim),
        Span::raw(sim.kind().to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" Flow: ").style(dim),
        Span::raw(format!("{}%", app.controller.flow().percent()))
            .style(Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" Tick: ").style(dim),
        Span::raw(format!("{}", sim.tick())).style(Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" "),
    ];
    if app.paused {
        spans.push(Span::raw("PAUSED ").style(Style::default().fg(Color::Yellow)));
    }
    Block::new()
        .title(Line::from(spans))
        .title_alignment(Alignment::Center)
}

/// World coordinates grow downward, canvas coordinates upward.
fn flip(y: f64) -> f64 {
    WORLD_HEIGHT - y
}

fn world_rect(rect: WorldRect, color: Color) -> Rectangle {
    Rectangle {
        x: rect.x,
        y: flip(rect.bottom()),
        width: rect.width,
        height: rect.height,
        color,
    }
}

struct NodeBox {
    rect: WorldRect,
    color: Color,
    label: String,
    load_label: Option<String>,
    fill: f64,
}

fn draw_world(frame: &mut Frame, sim: &Simulation, area: ratatui::layout::Rect) {
    let kind = sim.kind();
    let boxes = sim
        .topology()
        .nodes()
        .iter()
        .zip(summarize_nodes(sim))
        .enumerate()
        .map(|(i, (node, summary))| {
            let status = if summary.is_alive() { "ACTIVE" } else { "CRASHED" };
            NodeBox {
                rect: node.rect(),
                color: node_color(kind, i, summary.is_alive()),
                label: format!("{} {}", node.name().to_uppercase(), status),
                load_label: summary
                    .limit()
                    .map(|limit| format!("THREADS: {}/{}", summary.load(), limit)),
                fill: summary.utilization().min(1.0),
            }
        })
        .collect::<Vec<_>>();

    let db = summarize_database(sim);
    let db_color = if db.overloaded { ERROR_RED } else { DB_COLOR };
    let db_label = format!("DATABASE {}/{}", db.queued, db.capacity);

    let (failed, moving): (Vec<_>, Vec<_>) = sim
        .requests()
        .iter()
        .filter(|r| r.status != RequestStatus::Done)
        .partition(|r| r.is_failed());
    let failed = failed
        .iter()
        .map(|r| (r.position.x, flip(r.position.y)))
        .collect::<Vec<_>>();
    let moving = moving
        .iter()
        .map(|r| (r.position.x, flip(r.position.y)))
        .collect::<Vec<_>>();

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Line::from(vec![
                    Span::from(" Traffic ").style(Style::default().add_modifier(Modifier::BOLD)),
                ])),
        )
        .marker(Marker::Braille)
        .x_bounds([0.0, WORLD_WIDTH])
        .y_bounds([0.0, WORLD_HEIGHT])
        .paint(|ctx| {
            ctx.draw(&world_rect(DATABASE_RECT, db_color));
            ctx.print(
                DATABASE_RECT.x,
                flip(DATABASE_RECT.y) + 25.0,
                Span::styled(db_label.clone(), Style::default().fg(db_color)),
            );

            for b in &boxes {
                ctx.draw(&world_rect(b.rect, b.color));
                ctx.print(
                    b.rect.x,
                    flip(b.rect.y) + 25.0,
                    Span::styled(b.label.clone(), Style::default().fg(b.color)),
                );
                if let Some(load_label) = &b.load_label {
                    let bar = WorldRect::new(b.rect.x, b.rect.bottom() + 10.0, b.rect.width * b.fill, 10.0);
                    let bar_color = if b.color == DEAD_COLOR { ERROR_RED } else { b.color };
                    ctx.draw(&world_rect(bar, bar_color));
                    ctx.print(
                        b.rect.x,
                        flip(b.rect.bottom()) - 45.0,
                        Span::styled(load_label.clone(), Style::default().fg(b.color)),
                    );
                }
            }

            ctx.layer();
            ctx.draw(&Points {
                coords: &moving,
                color: request_color(RequestStatus::ToAuth),
            });
            ctx.draw(&Points {
                coords: &failed,
                color: request_color(RequestStatus::Failed),
            });
        });
    frame.render_widget(canvas, area);
}

fn build_node_table(sim: &Simulation) -> Table<'_> {
    let nodes = summarize_nodes(sim);
    let db = summarize_database(sim);

    let mut rows = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| node_row(i + 1, node))
        .collect::<Vec<Row>>();

    let db_style = if db.overloaded {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };
    rows.push(Row::new(vec![
        Cell::from("-"),
        Cell::from("database"),
        Cell::from(if db.overloaded { "OVERLOAD" } else { "OK" }).style(db_style),
        Cell::from(format!("{:>5}", db.queued)),
        Cell::from(format!("{:>5}", db.capacity)),
        Cell::from(format!("{:>6.2}", db.occupancy())).style(db_style),
    ]));

    Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(7),
        ],
    )
    .header(
        Row::new([
            Cell::from("Key"),
            Cell::from("Name"),
            Cell::from("Status"),
            Cell::from(" Load"),
            Cell::from("Limit"),
            Cell::from("  Util"),
        ])
        .style(Style::default().bg(Color::DarkGray).fg(White)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(Line::from(vec![
                Span::from(" Nodes ").style(Style::default().add_modifier(Modifier::BOLD)),
            ]))
            .padding(Padding::horizontal(1)),
    )
}

fn node_row(key: usize, node: &NodeSummary) -> Row<'static> {
    let style = risk_style(node.risk());
    let limit = node
        .limit()
        .map(|l| format!("{:>5}", l))
        .unwrap_or_else(|| format!("{:>5}", "-"));
    Row::new(vec![
        Cell::from(key.to_string()),
        Cell::from(node.name().to_string()),
        Cell::from(if node.is_alive() { "ACTIVE" } else { "CRASHED" }).style(style),
        Cell::from(format!("{:>5}", node.load())),
        Cell::from(limit),
        Cell::from(format!("{:>6.2}", node.utilization())).style(style),
    ])
}

fn build_sparkline(
    title: String,
    history: &VecDeque<u32>,
    color: Color,
    area: ratatui::layout::Rect,
) -> Sparkline<'static> {
    let width = area.width.saturating_sub(2) as usize;
    let skip = history.len().saturating_sub(width);
    let values = history
        .iter()
        .skip(skip)
        .map(|v| *v as u64)
        .collect::<Vec<u64>>();
    Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::from(title).style(Style::default().fg(color).add_modifier(Modifier::BOLD))),
        )
        .data(values)
        .max(120)
        .style(Style::default().fg(color))
}
