use crate::inject::EnvStore;
use crate::resolve::VariableFrequencyTable;
use colored::Colorize;

const LABEL_W: usize = 26;

/// Build the JSON document printed by `--probe --json`.
pub fn probe_json(table: &VariableFrequencyTable, env: &impl EnvStore) -> serde_json::Value {
    let variables: serde_json::Map<String, serde_json::Value> = table
        .iter()
        .map(|(name, counts)| {
            let values: serde_json::Map<String, serde_json::Value> = counts
                .iter()
                .map(|(value, count)| (value.to_string(), serde_json::json!(count)))
                .collect();
            (
                name.to_string(),
                serde_json::json!({
                    "current": env.get(name),
                    "selected": counts.most_common().map(|(v, _)| v),
                    "observations": counts.total(),
                    "values": values,
                }),
            )
        })
        .collect();

    serde_json::json!({ "variables": variables })
}

pub fn print_probe_json(table: &VariableFrequencyTable, env: &impl EnvStore) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&probe_json(table, env))?);
    Ok(())
}

pub fn print_probe(table: &VariableFrequencyTable, env: &impl EnvStore) {
    let title = "Session variables";
    println!("── {} {}", title.bold(), "─".repeat(40));

    for (name, counts) in table.iter() {
        let padded = format!("{:<w$}", name, w = LABEL_W);
        let current = match env.get(name).filter(|v| !v.is_empty()) {
            Some(v) => format!("set: {}", v).green(),
            None => "unset".yellow(),
        };
        println!("  {} {}", padded.bold(), current);

        if counts.is_empty() {
            println!("    {}", "not found in any process".red());
            continue;
        }

        let selected = counts.most_common().map(|(v, _)| v);
        for (value, count) in counts.iter() {
            let marker = if Some(value) == selected {
                "*".green().bold()
            } else {
                " ".normal()
            };
            println!("  {} {:>5}  {}", marker, count, value);
        }
    }
    println!();
}
