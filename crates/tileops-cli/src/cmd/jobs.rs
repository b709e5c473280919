use crate::context::{Context, GlobalArgs};
use crate::output::{or_dash, print_json, print_table};
use anyhow::Context as _;
use chrono::NaiveDate;
use clap::Subcommand;
use tileops_core::dashboard::JobDetail;
use tileops_core::money::format_usd;
use tileops_core::status::JobStatus;
use tileops_core::validation::NewJob;
use tileops_core::views::{View, ViewKind, ViewRequest};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum JobSubcommand {
    /// List jobs in dashboard order
    List {
        /// Only jobs assigned to the acting profile
        #[arg(long)]
        mine: bool,
    },

    /// Full detail for one job
    Show { id: String },

    /// Create a new lead (owner only)
    Create(CreateArgs),

    /// Move a job to another status
    Status {
        id: String,
        /// Target status, e.g. in_progress
        status: JobStatus,
    },
}

#[derive(clap::Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub client: String,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    /// e.g. bathroom, shower, backsplash
    #[arg(long = "type")]
    pub job_type: Option<String>,
    #[arg(long)]
    pub sqft: Option<f64>,
    #[arg(long)]
    pub scope: Option<String>,
    #[arg(long)]
    pub start: Option<NaiveDate>,
    #[arg(long)]
    pub end: Option<NaiveDate>,
    #[arg(long)]
    pub days: Option<i64>,
    #[arg(long)]
    pub cost: Option<f64>,
    /// Profile id of the crew lead
    #[arg(long)]
    pub assign: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl From<CreateArgs> for NewJob {
    fn from(a: CreateArgs) -> Self {
        NewJob {
            title: a.title,
            client_name: a.client,
            client_phone: a.phone,
            client_email: a.email,
            client_address: a.address,
            job_type: a.job_type,
            square_footage: a.sqft,
            scope_notes: a.scope,
            scheduled_start: a.start,
            scheduled_end: a.end,
            estimated_days: a.days,
            estimated_cost: a.cost,
            assigned_to: a.assign,
            notes: a.notes,
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(args: &GlobalArgs, subcmd: JobSubcommand) -> anyhow::Result<()> {
    let ctx = Context::load(args)?;
    match subcmd {
        JobSubcommand::List { mine } => list(&ctx, mine),
        JobSubcommand::Show { id } => show(&ctx, &id),
        JobSubcommand::Create(create_args) => create(&ctx, create_args.into()),
        JobSubcommand::Status { id, status: target } => status(&ctx, &id, target),
    }
}

fn list(ctx: &Context, mine: bool) -> anyhow::Result<()> {
    let actor = ctx.actor()?;
    let request = ViewRequest {
        kind: ViewKind::List,
        mine_only: mine,
        month: None,
    };
    let View::List(list) = ctx.dashboard.view(&actor, &request, ctx.today) else {
        anyhow::bail!("list view did not render as a list");
    };

    if ctx.json {
        return print_json(&list);
    }
    if let Some(message) = list.empty_message {
        println!("{message}");
        return Ok(());
    }

    let rows = list
        .rows
        .iter()
        .map(|r| {
            let marker = if r.highlighted { "*" } else { "" };
            vec![
                format!("#{}{marker}", r.job.job_number),
                r.job.title.clone(),
                r.job.client_name.clone(),
                r.status_label.to_string(),
                or_dash(r.job.assignee.as_ref().map(|p| p.full_name.clone())),
                or_dash(r.job.scheduled_start),
                or_dash(r.job.scheduled_end),
                or_dash(r.job.estimated_cost.map(|c| format_usd(c, 0))),
            ]
        })
        .collect();
    print_table(
        &["#", "Title", "Client", "Status", "Assigned", "Start", "End", "Estimate"],
        rows,
    );
    Ok(())
}

fn show(ctx: &Context, id: &str) -> anyhow::Result<()> {
    let actor = ctx.actor()?;
    let detail = ctx
        .dashboard
        .job_detail(&actor, id)
        .with_context(|| format!("job '{id}' not found"))?;

    if ctx.json {
        return print_json(&detail);
    }
    print_detail(&detail);
    Ok(())
}

fn print_detail(d: &JobDetail) {
    let job = &d.job;
    println!("Job #{}: {}", job.job_number, job.title);
    println!("Status:   {}", d.status_label);
    println!("Client:   {}", job.client_name);
    if let Some(phone) = &job.client_phone {
        println!("Phone:    {phone}");
    }
    if let Some(email) = &job.client_email {
        println!("Email:    {email}");
    }
    if let Some(address) = &job.client_address {
        println!("Address:  {address}");
    }
    println!(
        "Assigned: {}",
        or_dash(job.assignee.as_ref().map(|p| p.full_name.clone()))
    );
    if let Some(creator) = &d.creator {
        println!("Created by: {}", creator.full_name);
    }
    if let Some(start) = job.scheduled_start {
        println!("Schedule: {start} to {}", or_dash(job.scheduled_end));
    }

    let f = &d.financials;
    println!();
    println!("Estimated: {}", format_usd(f.estimated, 2));
    if let Some(actual) = f.actual {
        println!("Actual:    {}", format_usd(actual, 2));
    }
    println!("Invoiced:  {}", format_usd(f.invoiced, 2));
    println!("Paid:      {}", format_usd(f.paid, 2));
    if let Some(balance) = f.balance_due {
        println!("Balance:   {}", format_usd(balance, 2));
    }
    if let Some(label) = &f.variance_label {
        println!("Variance:  {label}");
    }

    if let Some(perf) = &d.performance {
        println!();
        if let Some(days) = &perf.days {
            println!("Days: {} of {} ({})", days.actual, days.estimated, days.label);
        }
        if let Some(cost) = &perf.cost {
            println!("Cost: {}", cost.label);
        }
    }

    if !d.invoices.is_empty() {
        println!();
        println!("Invoices:");
        for inv in &d.invoices {
            println!(
                "  {}  {}  {}  due {}",
                inv.invoice_number,
                format_usd(inv.amount, 2),
                inv.status.label(),
                inv.due_date
            );
        }
    }
    if !d.photos.is_empty() {
        println!();
        println!("Photos: {}", d.photos.len());
    }
    if !d.transitions.is_empty() {
        let options: Vec<String> = d
            .transitions
            .iter()
            .map(|t| format!("{} ({})", t.label, t.next))
            .collect();
        println!();
        println!("Next: {}", options.join(", "));
    }
}

fn create(ctx: &Context, new_job: NewJob) -> anyhow::Result<()> {
    let actor = ctx.actor()?;
    let job = ctx
        .dashboard
        .create_job(&actor, new_job)
        .context("failed to create job")?;

    if ctx.json {
        print_json(&job)?;
    } else {
        println!("Created job #{}: {} ({})", job.job_number, job.title, job.id);
    }
    Ok(())
}

fn status(ctx: &Context, id: &str, target: JobStatus) -> anyhow::Result<()> {
    let actor = ctx.actor()?;
    let job = ctx
        .dashboard
        .change_status(&actor, id, target)
        .with_context(|| format!("cannot move job '{id}' to {target}"))?;

    if ctx.json {
        print_json(&job)?;
    } else {
        println!("Job #{} is now {}", job.job_number, job.status.label());
    }
    Ok(())
}
