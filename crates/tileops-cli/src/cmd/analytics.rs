use crate::context::{Context, GlobalArgs};
use crate::output::{print_json, print_table};
use tileops_core::analytics::dashboard_metrics;
use tileops_core::money::format_usd;

pub fn run(args: &GlobalArgs) -> anyhow::Result<()> {
    let ctx = Context::load(args)?;
    ctx.actor()?;
    let report = ctx.dashboard.analytics();
    let metrics = dashboard_metrics(&ctx.dashboard.jobs(), ctx.today);

    if ctx.json {
        return print_json(&serde_json::json!({
            "metrics": metrics,
            "report": report,
        }));
    }

    println!("Total jobs:          {}", metrics.total_jobs);
    println!("Active jobs:         {}", metrics.active_jobs);
    println!("Done this month:     {}", metrics.completed_this_month);
    println!("Revenue this month:  {}", format_usd(metrics.revenue_this_month, 0));
    println!();
    println!("Total revenue:       {}", format_usd(report.total_revenue, 0));
    println!("Average job value:   {}", format_usd(report.average_job_value, 0));
    println!("On-time rate:        {}%", report.on_time_rate);
    println!("Pipeline value:      {}", format_usd(report.pipeline_value, 0));

    println!();
    let rows = report
        .by_status
        .iter()
        .map(|bar| vec![bar.label.to_string(), bar.value.to_string()])
        .collect();
    print_table(&["Status", "Jobs"], rows);

    if !report.budget.is_empty() {
        println!();
        let rows = report
            .budget
            .iter()
            .map(|b| {
                vec![
                    format!("#{}", b.job_number),
                    b.title.clone(),
                    format_usd(b.estimated, 0),
                    format_usd(b.actual, 0),
                    b.label.clone(),
                ]
            })
            .collect();
        print_table(&["#", "Job", "Estimated", "Actual", "Budget"], rows);
    }

    if !report.schedule.is_empty() {
        println!();
        let rows = report
            .schedule
            .iter()
            .map(|s| {
                vec![
                    format!("#{}", s.job_number),
                    s.title.clone(),
                    s.estimated_days.to_string(),
                    s.actual_days.to_string(),
                    s.label.clone(),
                ]
            })
            .collect();
        print_table(&["#", "Job", "Est. days", "Actual days", "Schedule"], rows);
    }

    if !report.workload.is_empty() {
        println!();
        let rows = report
            .workload
            .iter()
            .map(|w| {
                vec![
                    w.name.clone(),
                    w.assigned.to_string(),
                    w.active.to_string(),
                    w.completed.to_string(),
                ]
            })
            .collect();
        print_table(&["Crew", "Assigned", "Active", "Completed"], rows);
    }
    Ok(())
}
