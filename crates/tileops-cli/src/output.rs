use serde::Serialize;

const GAP: &str = "  ";

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    print!("{}", render_table(headers, &rows));
}

/// `-` for absent values in table cells.
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Amounts, counts and job numbers line up on the right.
fn is_numeric(cell: &str) -> bool {
    let digits = cell
        .trim_start_matches('-')
        .trim_start_matches(['$', '#'])
        .trim_end_matches('%');
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.')
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let columns = headers.len();
    let width = |i: usize| {
        rows.iter()
            .filter_map(|r| r.get(i))
            .map(|c| c.chars().count())
            .chain([headers[i].chars().count()])
            .max()
            .unwrap_or(0)
    };
    let widths: Vec<usize> = (0..columns).map(width).collect();
    let right: Vec<bool> = (0..columns)
        .map(|i| {
            let cells: Vec<&String> = rows
                .iter()
                .filter_map(|r| r.get(i))
                .filter(|c| c.as_str() != "-")
                .collect();
            !cells.is_empty() && cells.iter().all(|c| is_numeric(c))
        })
        .collect();

    let mut out = line(headers, &widths, &right);
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out += &line(&rule, &widths, &right);
    for row in rows {
        out += &line(row, &widths, &right);
    }
    out
}

fn line<S: AsRef<str>>(cells: &[S], widths: &[usize], right: &[bool]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .map(|c| c.as_ref())
        .enumerate()
        .map(|(i, cell)| match (widths.get(i), right.get(i)) {
            (Some(&w), Some(true)) => format!("{cell:>w$}"),
            (Some(&w), _) => format!("{cell:<w$}"),
            (None, _) => cell.to_string(),
        })
        .collect();
    format!("{}\n", padded.join(GAP).trim_end())
}
