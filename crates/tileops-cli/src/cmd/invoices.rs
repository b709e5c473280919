use crate::context::{Context, GlobalArgs};
use crate::output::{or_dash, print_json, print_table};
use anyhow::Context as _;
use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use tileops_core::dashboard::InvoiceRow;
use tileops_core::invoice::{InvoiceFilter, LineItemInput, NewInvoice};
use tileops_core::money::format_usd;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum InvoiceSubcommand {
    /// List invoices, newest first
    List {
        /// all, draft, sent, paid or overdue
        #[arg(long, default_value = "all")]
        status: InvoiceFilter,
    },

    /// Show one invoice with its line items
    Show { id: String },

    /// Create a draft invoice for a job
    Create {
        /// Job the invoice bills for
        #[arg(long)]
        job: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        /// Line item as DESCRIPTION:QUANTITY:UNIT_PRICE (repeatable)
        #[arg(long = "line", value_parser = parse_line)]
        lines: Vec<LineItemInput>,
        #[arg(long)]
        discount: Option<f64>,
    },

    /// Mark a draft as sent
    Send { id: String },

    /// Record payment for a sent or overdue invoice
    Pay { id: String },
}

/// `Tile and grout:2:450.50`. The description may itself contain colons.
fn parse_line(s: &str) -> Result<LineItemInput, String> {
    let mut parts = s.rsplitn(3, ':');
    let (Some(price), Some(quantity), Some(description)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected DESCRIPTION:QUANTITY:UNIT_PRICE, got '{s}'"));
    };
    let quantity: f64 = quantity
        .trim()
        .parse()
        .map_err(|_| format!("invalid quantity '{quantity}'"))?;
    let unit_price: f64 = price
        .trim()
        .trim_start_matches('$')
        .replace(',', "")
        .parse()
        .map_err(|_| format!("invalid unit price '{price}'"))?;
    Ok(LineItemInput {
        description: description.trim().to_string(),
        quantity,
        unit_price,
    })
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(args: &GlobalArgs, subcmd: InvoiceSubcommand) -> anyhow::Result<()> {
    let ctx = Context::load(args)?;
    match subcmd {
        InvoiceSubcommand::List { status } => list(&ctx, status),
        InvoiceSubcommand::Show { id } => show(&ctx, &id),
        InvoiceSubcommand::Create {
            job,
            due,
            lines,
            discount,
        } => create(
            &ctx,
            NewInvoice {
                job_id: job,
                due_date: due,
                line_items: lines,
                discount,
            },
        ),
        InvoiceSubcommand::Send { id } => send(&ctx, &id),
        InvoiceSubcommand::Pay { id } => pay(&ctx, &id),
    }
}

fn list(ctx: &Context, filter: InvoiceFilter) -> anyhow::Result<()> {
    let actor = ctx.actor()?;
    let list = ctx.dashboard.invoices(&actor, filter, ctx.today)?;

    if ctx.json {
        return print_json(&list);
    }
    if list.invoices.is_empty() {
        println!("No {filter} invoices ({} total).", list.total);
        return Ok(());
    }
    let rows = list
        .invoices
        .iter()
        .map(|row| {
            vec![
                row.invoice_number.clone(),
                or_dash(row.invoice.job.as_ref().map(|j| j.title.clone())),
                format_usd(row.amount, 2),
                row.status_label.to_string(),
                row.due_date.to_string(),
            ]
        })
        .collect();
    print_table(&["Number", "Job", "Amount", "Status", "Due"], rows);
    Ok(())
}

fn show(ctx: &Context, id: &str) -> anyhow::Result<()> {
    let actor = ctx.actor()?;
    let row = ctx
        .dashboard
        .invoice(&actor, id, ctx.today)
        .with_context(|| format!("invoice '{id}' not found"))?;
    if ctx.json {
        return print_json(&row);
    }
    print_invoice(&row);
    Ok(())
}

fn print_invoice(row: &InvoiceRow) {
    println!("{}  {}", row.invoice_number, row.status_label);
    if let Some(job) = &row.invoice.job {
        println!("Job:    #{} {} ({})", job.job_number, job.title, job.client_name);
    }
    println!("Due:    {}", row.due_date);
    if !row.line_items.is_empty() {
        println!();
        let rows = row
            .line_items
            .iter()
            .map(|l| {
                vec![
                    l.description.clone(),
                    l.quantity.to_string(),
                    format_usd(l.unit_price, 2),
                    format_usd(l.amount, 2),
                ]
            })
            .collect();
        print_table(&["Item", "Qty", "Price", "Amount"], rows);
    }
    println!();
    println!("Total:  {}", format_usd(row.amount, 2));
}

fn create(ctx: &Context, new_invoice: NewInvoice) -> anyhow::Result<()> {
    let actor = ctx.actor()?;
    let row = ctx
        .dashboard
        .create_invoice(&actor, new_invoice, ctx.today)
        .context("failed to create invoice")?;
    if ctx.json {
        print_json(&row)?;
    } else {
        println!(
            "Created {} for {} ({})",
            row.invoice_number,
            format_usd(row.amount, 2),
            row.id
        );
    }
    Ok(())
}

fn send(ctx: &Context, id: &str) -> anyhow::Result<()> {
    let actor = ctx.actor()?;
    let row = ctx
        .dashboard
        .send_invoice(&actor, id, Utc::now())
        .with_context(|| format!("cannot send invoice '{id}'"))?;
    report(ctx, &row, "sent")
}

fn pay(ctx: &Context, id: &str) -> anyhow::Result<()> {
    let actor = ctx.actor()?;
    let row = ctx
        .dashboard
        .pay_invoice(&actor, id, Utc::now())
        .with_context(|| format!("cannot mark invoice '{id}' paid"))?;
    report(ctx, &row, "paid")
}

fn report(ctx: &Context, row: &InvoiceRow, verb: &str) -> anyhow::Result<()> {
    if ctx.json {
        print_json(row)
    } else {
        println!("{} marked {verb}", row.invoice_number);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_parses_description_quantity_price() {
        let line = parse_line("Porcelain tile: 12x24:2:$1,250.50").unwrap();
        assert_eq!(line.description, "Porcelain tile: 12x24");
        assert_eq!(line.quantity, 2.0);
        assert_eq!(line.unit_price, 1250.5);
    }

    #[test]
    fn line_needs_three_parts() {
        assert!(parse_line("Labor:800").is_err());
        assert!(parse_line("Labor:two:800").is_err());
    }
}
