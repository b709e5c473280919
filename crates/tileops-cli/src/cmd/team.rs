use crate::context::{Context, GlobalArgs};
use crate::output::{or_dash, print_json, print_table};

pub fn run(args: &GlobalArgs, map: bool) -> anyhow::Result<()> {
    let ctx = Context::load(args)?;
    ctx.actor()?;
    if map {
        team_map(&ctx)
    } else {
        roster(&ctx)
    }
}

fn roster(ctx: &Context) -> anyhow::Result<()> {
    let team = ctx.dashboard.team();
    if ctx.json {
        return print_json(&team);
    }
    let rows = team
        .iter()
        .map(|p| {
            vec![
                p.full_name.clone(),
                p.role.to_string(),
                p.email.clone(),
                or_dash(p.phone.clone()),
                p.id.clone(),
            ]
        })
        .collect();
    print_table(&["Name", "Role", "Email", "Phone", "Id"], rows);
    Ok(())
}

fn team_map(ctx: &Context) -> anyhow::Result<()> {
    let map = ctx.dashboard.team_map();
    if ctx.json {
        return print_json(&map);
    }
    println!(
        "Centre {:.4}, {:.4} (zoom {})",
        map.center.lat, map.center.lng, map.zoom
    );
    println!();
    let rows = map
        .members
        .iter()
        .map(|m| {
            vec![
                m.initial.clone(),
                m.name.clone(),
                format!("{:.4}, {:.4}", m.position.lat, m.position.lng),
                or_dash(m.last_seen.map(|t| t.format("%Y-%m-%d %H:%M").to_string())),
            ]
        })
        .collect();
    print_table(&["", "Crew", "Position", "Last seen"], rows);
    println!();
    let rows = map
        .jobs
        .iter()
        .map(|j| {
            vec![
                format!("#{}", j.job_number),
                j.title.clone(),
                j.status_label.to_string(),
                format!("{:.4}, {:.4}", j.position.lat, j.position.lng),
            ]
        })
        .collect();
    print_table(&["#", "Job site", "Status", "Position"], rows);
    Ok(())
}
