use crate::context::{Context, GlobalArgs};
use crate::output::{print_json, print_table};
use clap::Subcommand;
use tileops_core::dates::YearMonth;
use tileops_core::status::JobStatus;
use tileops_core::views::{
    CalendarMonth, KanbanBoard, MoveState, StatusChangeOutcome, Timeline, View, ViewKind,
    ViewRequest,
};

#[derive(Subcommand)]
pub enum KanbanSubcommand {
    /// Drop a card on another column
    Move {
        job_id: String,
        /// Column to drop on, e.g. completed
        status: JobStatus,
    },
}

fn render(ctx: &Context, kind: ViewKind, month: Option<YearMonth>) -> anyhow::Result<View> {
    let actor = ctx.actor()?;
    let request = ViewRequest {
        kind,
        mine_only: false,
        month,
    };
    Ok(ctx.dashboard.view(&actor, &request, ctx.today))
}

// ---------------------------------------------------------------------------
// kanban
// ---------------------------------------------------------------------------

pub fn kanban(args: &GlobalArgs, subcmd: Option<KanbanSubcommand>) -> anyhow::Result<()> {
    let ctx = Context::load(args)?;
    let View::Kanban(board) = render(&ctx, ViewKind::Kanban, None)? else {
        anyhow::bail!("kanban view did not render as a board");
    };
    match subcmd {
        None => show_board(&ctx, &board),
        Some(KanbanSubcommand::Move { job_id, status }) => move_card(&ctx, board, &job_id, status),
    }
}

fn show_board(ctx: &Context, board: &KanbanBoard) -> anyhow::Result<()> {
    if ctx.json {
        return print_json(board);
    }
    for column in &board.columns {
        println!("{} ({})", column.label, column.count);
        for card in &column.cards {
            let lock = if card.draggable { "" } else { " [locked]" };
            let state = match &card.move_state {
                Some(MoveState::Pending { from }) => format!(" [moving from {}]", from.label()),
                Some(MoveState::Confirmed) => " [moved]".to_string(),
                Some(MoveState::Rejected { reason }) => format!(" [rejected: {reason}]"),
                None => String::new(),
            };
            println!(
                "  #{} {} - {}{lock}{state}",
                card.job.job_number, card.job.title, card.job.client_name
            );
        }
    }
    Ok(())
}

/// Apply the drop to the board, send it to the store, then fold the answer
/// back so a refused move lands in its original column.
fn move_card(
    ctx: &Context,
    mut board: KanbanBoard,
    job_id: &str,
    target: JobStatus,
) -> anyhow::Result<()> {
    let outcome = match board.request_move(job_id, target) {
        Ok(command) => ctx.dashboard.request_status_change(&command),
        Err(e) => StatusChangeOutcome::Rejected {
            job_id: job_id.to_string(),
            reason: e.to_string(),
        },
    };
    board.settle(&outcome);

    if ctx.json {
        print_json(&outcome)?;
    } else {
        show_board(ctx, &board)?;
    }
    match outcome {
        StatusChangeOutcome::Confirmed { .. } => Ok(()),
        StatusChangeOutcome::Rejected { reason, .. } => anyhow::bail!("move rejected: {reason}"),
    }
}

// ---------------------------------------------------------------------------
// calendar
// ---------------------------------------------------------------------------

pub fn calendar(args: &GlobalArgs, month: Option<YearMonth>) -> anyhow::Result<()> {
    let ctx = Context::load(args)?;
    let View::Calendar(cal) = render(&ctx, ViewKind::Calendar, month)? else {
        anyhow::bail!("calendar view did not render as a month");
    };
    if ctx.json {
        return print_json(&cal);
    }
    print_calendar(&cal);
    Ok(())
}

fn print_calendar(cal: &CalendarMonth) {
    println!("{}  (prev {}, next {})", cal.label, cal.prev, cal.next);
    println!();
    let header: Vec<String> = cal.weekdays.iter().map(|d| format!("{d:>4}")).collect();
    println!("{}", header.join(""));
    for week in &cal.weeks {
        let line: Vec<String> = week
            .iter()
            .map(|cell| match cell.day {
                Some(day) if cell.is_today => format!("{:>3}*", day),
                Some(day) if !cell.chips.is_empty() => format!("{:>3}+", day),
                Some(day) => format!("{:>4}", day),
                None => "    ".to_string(),
            })
            .collect();
        println!("{}", line.join("").trim_end());
    }

    println!();
    for cell in cal.weeks.iter().flatten() {
        let Some(date) = cell.date else { continue };
        if cell.chips.is_empty() {
            continue;
        }
        let chips: Vec<String> = cell
            .chips
            .iter()
            .map(|c| format!("#{} {}", c.job_number, c.title))
            .collect();
        let more = if cell.overflow > 0 {
            format!(", +{} more", cell.overflow)
        } else {
            String::new()
        };
        println!("{date}  {}{more}", chips.join(", "));
    }
}

// ---------------------------------------------------------------------------
// timeline
// ---------------------------------------------------------------------------

pub fn timeline(args: &GlobalArgs, month: Option<YearMonth>) -> anyhow::Result<()> {
    let ctx = Context::load(args)?;
    let View::Timeline(timeline) = render(&ctx, ViewKind::Timeline, month)? else {
        anyhow::bail!("timeline view did not render as a timeline");
    };
    if ctx.json {
        return print_json(&timeline);
    }
    print_timeline(&timeline);
    Ok(())
}

fn print_timeline(t: &Timeline) {
    println!("{} to {} ({} days)", t.start, t.end, t.total_days);
    let rows = t
        .rows
        .iter()
        .flat_map(|row| {
            let name = format!("{} ({})", row.name, row.job_count);
            if row.bars.is_empty() {
                return vec![vec![name, "-".into(), String::new()]];
            }
            row.bars
                .iter()
                .enumerate()
                .map(|(i, bar)| {
                    let label = if i == 0 { name.clone() } else { String::new() };
                    let track = format!(
                        "{}{}",
                        " ".repeat(bar.offset as usize),
                        "#".repeat(bar.span as usize)
                    );
                    vec![label, format!("#{} {}", bar.job_number, bar.title), track]
                })
                .collect()
        })
        .collect();
    print_table(&["Crew", "Job", "Schedule"], rows);
    if let Some(offset) = t.today_offset {
        println!("Today is day {} of the window", offset + 1);
    }
}
