use std::collections::HashMap;
use std::io::stdout;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders},
};
use stackline_core::{
    DragOutcome, InteractionSession, Modifiers, ProposedItem, RowMode, Timeline,
};
use stackline_protocol::{ItemId, ItemRecord, LayoutCommand, RowId, Timestamp, Trigger};
use tracing::debug;

use crate::scene::{TimeScale, reposition};

/// Horizontal pixels represented by one terminal column.
const CELL_PX: f64 = 8.0;
/// Vertical pixels represented by one terminal line. One default-height
/// item plus its gap fills a line.
const LINE_PX: f64 = 21.0;
const GUTTER: u16 = 14;

const ITEM_COLORS: [Color; 4] = [Color::Blue, Color::Green, Color::Magenta, Color::Cyan];

struct Preview {
    timeline: Timeline,
    scale: TimeScale,
    selected: usize,
    scroll: u16,
    affordances: HashMap<RowId, bool>,
    session: InteractionSession,
    created: usize,
}

impl Preview {
    fn new(timeline: Timeline, scale: TimeScale) -> Self {
        let mut preview = Self {
            timeline,
            scale,
            selected: 0,
            scroll: 0,
            affordances: HashMap::new(),
            session: InteractionSession::new(),
            created: 0,
        };
        let commands = preview.timeline.layout_all();
        preview.absorb(&commands);
        preview
    }

    fn absorb(&mut self, commands: &[LayoutCommand]) {
        for command in commands {
            if let LayoutCommand::SetToggleAffordanceVisible { row, visible } = command {
                self.affordances.insert(row.clone(), *visible);
            }
        }
    }

    fn selected_row(&self) -> Option<RowId> {
        self.timeline.rows().get(self.selected).map(|row| row.id.clone())
    }

    /// Refit extents to `columns` and lay everything out for the new viewport.
    fn refit(&mut self, columns: u16) -> Result<()> {
        let width = f64::from(columns) * CELL_PX;
        if width != self.scale.width() {
            self.scale = self.scale.with_width(width);
            reposition(&mut self.timeline, &self.scale)?;
            let commands = self.timeline.handle(&Trigger::ViewportRangeChanged)?;
            self.absorb(&commands);
        }
        Ok(())
    }

    fn pan(&mut self, fraction: f64) -> Result<()> {
        let window = self.scale.window();
        let delta = (window.duration() as f64 * fraction) as i64;
        self.scale = self.scale.with_window(window.shifted(delta));
        reposition(&mut self.timeline, &self.scale)?;
        let commands = self.timeline.handle(&Trigger::ViewportRangeChanged)?;
        self.absorb(&commands);
        Ok(())
    }

    fn toggle_selected(&mut self) -> Result<()> {
        if let Some(row) = self.selected_row() {
            let commands = self.timeline.handle(&Trigger::ToggleRequested(row))?;
            self.absorb(&commands);
        }
        Ok(())
    }

    fn recompute_selected(&mut self) -> Result<()> {
        if let Some(row) = self.selected_row() {
            let commands = self.timeline.handle(&Trigger::ItemStructureChanged(row))?;
            self.absorb(&commands);
        }
        Ok(())
    }

    /// First content line and line count of every row, in row order.
    fn row_lines(&self) -> Vec<(u16, u16)> {
        let mut line: u16 = 0;
        self.timeline
            .rows()
            .iter()
            .map(|row| {
                let height_px = row
                    .height()
                    .unwrap_or_else(|| self.timeline.config().min_row_height());
                let lines = ((height_px / LINE_PX).ceil() as u16).max(1);
                let this = (line, lines);
                line = line.saturating_add(lines);
                this
            })
            .collect()
    }

    /// Map a screen cell to a time, a timeline-global y and the row under it.
    fn locate(&self, column: u16, screen_line: u16) -> Option<(Timestamp, f64, Option<RowId>)> {
        if column < GUTTER || screen_line == 0 {
            return None;
        }
        let time = self
            .scale
            .time_at(f64::from(column - GUTTER) * CELL_PX + CELL_PX / 2.0);
        let line = (screen_line - 1).saturating_add(self.scroll);

        let rows = self.row_lines().into_iter().zip(self.timeline.row_tops());
        for ((start, lines), (row, top)) in rows {
            if (start..start.saturating_add(lines)).contains(&line) {
                let y = top + f64::from(line - start) * LINE_PX + LINE_PX / 2.0;
                return Some((time, y, Some(row)));
            }
        }
        // Below the last row.
        Some((time, f64::from(line) * LINE_PX, None))
    }

    /// Route a mouse event through the interaction session.
    fn pointer(&mut self, event: MouseEvent) -> Result<()> {
        let Some((time, y, row)) = self.locate(event.column, event.row) else {
            if matches!(event.kind, MouseEventKind::Up(MouseButton::Left)) {
                self.session.cancel_drag();
            }
            return Ok(());
        };
        let modifiers = Modifiers {
            shift: event.modifiers.contains(KeyModifiers::SHIFT),
            ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
            alt: event.modifiers.contains(KeyModifiers::ALT),
        };
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.session.begin_drag(time, y, modifiers).is_none() {
                    self.session.click(time, y, modifiers, &self.timeline);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.session.update_drag(time, y, &self.timeline);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let outcome = self.session.end_drag(time, y, row.as_ref(), &self.timeline);
                if let DragOutcome::Create(proposed) = outcome {
                    self.create(proposed)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Add the item sketched by a create-drag and lay out its row again.
    fn create(&mut self, proposed: ProposedItem) -> Result<()> {
        let id = loop {
            self.created += 1;
            let id = ItemId::from(format!("new-{}", self.created));
            if self.timeline.item(&id).is_none() {
                break id;
            }
        };
        let mut record = ItemRecord::new(id, proposed.row.clone(), proposed.start, proposed.end);
        record.extent = self.scale.extent(proposed.start, proposed.end);
        self.timeline.add_item(record)?;
        let commands = self
            .timeline
            .handle(&Trigger::ItemStructureChanged(proposed.row))?;
        self.absorb(&commands);
        Ok(())
    }

    fn draw(&self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let window = self.scale.window();

        let header_area = Rect::new(0, 0, area.width, 1);
        let header = Block::default()
            .title(format!(
                " stackline {}..{} | ←→ pan | ↑↓ row | t toggle | r recompute | shift-drag select | ctrl-drag create | q quit ",
                window.start, window.end
            ))
            .style(Style::default().fg(Color::White).bg(Color::DarkGray));
        frame.render_widget(header, header_area);

        let content = Rect::new(0, 1, area.width, area.height.saturating_sub(1));
        let block = Block::default()
            .borders(Borders::NONE)
            .style(Style::default().bg(Color::Black));
        frame.render_widget(block, content);

        if content.width <= GUTTER {
            return;
        }
        let lanes_x = content.x + GUTTER;
        let lanes_width = content.width - GUTTER;
        let buf = frame.buffer_mut();

        let rows = self.timeline.rows().iter().zip(self.row_lines());
        for (index, (row, (line, _))) in rows.enumerate() {
            let visible_top = line.saturating_sub(self.scroll);
            let on_screen = line >= self.scroll && visible_top < content.height;
            if on_screen {
                let marker = match row.mode() {
                    RowMode::Stacked => '▾',
                    RowMode::Unstacked => '▸',
                };
                let toggle = if self.affordances.get(&row.id).copied().unwrap_or(false) {
                    '±'
                } else {
                    ' '
                };
                let label = format!("{marker}{toggle}{}", row.id);
                let style = if index == self.selected {
                    Style::default().fg(Color::Black).bg(Color::Yellow)
                } else {
                    Style::default().fg(Color::White).bg(Color::DarkGray)
                };
                let y = content.y + visible_top;
                for (i, ch) in label.chars().take(GUTTER as usize - 1).enumerate() {
                    buf[(content.x + i as u16, y)].set_char(ch).set_style(style);
                }
            }

            for (n, item) in row.items().iter().enumerate() {
                let Some(top) = item.offset() else { continue };
                let item_line = line.saturating_add((top / LINE_PX).floor() as u16);
                if item_line < self.scroll || item_line - self.scroll >= content.height {
                    continue;
                }
                let y = content.y + item_line - self.scroll;

                let left = item.extent.left / CELL_PX;
                let right = item.extent.right() / CELL_PX;
                if right < 0.0 || left >= f64::from(lanes_width) {
                    continue;
                }
                let col = left.max(0.0) as u16;
                let end = (right.ceil() as u16).clamp(col + 1, lanes_width);

                let label = item.id.as_str();
                let fg = if self.session.selection().contains(&item.id) {
                    Color::Yellow
                } else {
                    ITEM_COLORS[n % ITEM_COLORS.len()]
                };
                for (i, x) in (col..end).enumerate() {
                    let ch = label.chars().nth(i).unwrap_or('█');
                    buf[(lanes_x + x, y)].set_char(ch).set_fg(fg).set_bg(Color::Black);
                }
            }
        }
    }
}

pub fn run_preview(timeline: Timeline, scale: TimeScale) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut preview = Preview::new(timeline, scale);

    let outcome = event_loop(&mut terminal, &mut preview);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    outcome
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    preview: &mut Preview,
) -> Result<()> {
    loop {
        let size = terminal.size()?;
        preview.refit(size.width.saturating_sub(GUTTER))?;
        terminal.draw(|frame| preview.draw(frame))?;

        if !event::poll(std::time::Duration::from_millis(100))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Left => preview.pan(-0.1)?,
                KeyCode::Right => preview.pan(0.1)?,
                KeyCode::Up => preview.selected = preview.selected.saturating_sub(1),
                KeyCode::Down => {
                    let last = preview.timeline.rows().len().saturating_sub(1);
                    preview.selected = (preview.selected + 1).min(last);
                }
                KeyCode::Char('t') => preview.toggle_selected()?,
                KeyCode::Char('r') => preview.recompute_selected()?,
                _ => {}
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => preview.scroll += 1,
                MouseEventKind::ScrollUp => preview.scroll = preview.scroll.saturating_sub(1),
                MouseEventKind::ScrollLeft => preview.pan(-0.05)?,
                MouseEventKind::ScrollRight => preview.pan(0.05)?,
                _ => preview.pointer(mouse)?,
            },
            _ => {}
        }
        debug!(row = preview.selected, scroll = preview.scroll, "input handled");
    }
    Ok(())
}
