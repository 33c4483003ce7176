/// Builds a short English instruction from an OSRM maneuver.
pub(crate) fn instruction_text(
    kind: &str,
    modifier: Option<&str>,
    name: &str,
    exit: Option<u32>,
) -> String {
    let mut text = match (kind, modifier) {
        ("arrive", _) => return String::from("Arrive at your destination"),
        ("depart", _) => String::from("Depart"),
        ("roundabout" | "rotary", _) => match exit {
            Some(exit) => format!("At the roundabout, take exit {exit}"),
            None => String::from("Enter the roundabout"),
        },
        ("continue" | "new name", Some("straight") | None) => String::from("Continue"),
        (_, Some("uturn")) => String::from("Make a U-turn"),
        (_, Some(modifier)) => format!("{} {}", capitalize(&verb(kind)), modifier),
        (_, None) => capitalize(&verb(kind)),
    };

    if !name.is_empty() {
        let preposition = match kind {
            "depart" | "continue" | "new name" => "on",
            _ => "onto",
        };
        text.push_str(&format!(" {preposition} {name}"));
    }

    text
}

fn verb(kind: &str) -> String {
    match kind {
        "turn" | "end of road" | "notification" => String::from("turn"),
        "new name" => String::from("continue"),
        "on ramp" => String::from("take the ramp"),
        "off ramp" => String::from("take the exit"),
        other => other.to_string(),
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
