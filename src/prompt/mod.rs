use chrono::NaiveDate;

use crate::wire::{GenerationRequest, Platform, Variant};

/// Per-post character budget the generation prompt asks the model to respect.
pub fn character_limit(platform: Platform, variant: Variant) -> usize {
    match variant {
        Variant::XOnly => 280,
        Variant::Generic => match platform {
            Platform::X => 140,
            Platform::Instagram => 300,
            Platform::Facebook | Platform::LinkedIn => 400,
        },
    }
}

pub fn character_limit_directive(limit: usize) -> String {
    format!("Keep each post within {limit} characters.")
}

/// The six post categories, in the order the model must fill them.
pub fn category_labels(post_date: NaiveDate) -> [String; 6] {
    let day = post_date.format("%B %-d");
    [
        "① Regular product introduction".to_string(),
        format!("② Post tied to the {day} moment"),
        "③ Engagement post (no campaign)".to_string(),
        "④ Post about the latest campaign".to_string(),
        "⑤ Unique, creative angle".to_string(),
        "⑥ Free-form post".to_string(),
    ]
}

fn category_hints(post_date: NaiveDate) -> [String; 6] {
    let day = post_date.format("%B %-d");
    [
        "A post introducing a product or service of the account...".to_string(),
        format!("A post matching the season or events around {day}..."),
        "A post that asks a question or invites empathy to raise engagement. Do not mention campaigns...".to_string(),
        "A post about a campaign that is running now or starts soon...".to_string(),
        "A post with an unusual viewpoint or phrasing that catches the reader's eye...".to_string(),
        "A post outside the categories above that still adds value to the account...".to_string(),
    ]
}

pub fn system_prompt_tone() -> String {
    "You are a social media marketing analyst. From the given account URL, describe the tone and manner that suits the account's posts.".to_string()
}

pub fn user_prompt_tone(req: &GenerationRequest, language: &str) -> String {
    let mut parts = vec![
        format!(
            "Based on the following {platform} account URL, briefly describe the tone and manner its posts should have.",
            platform = req.platform()
        ),
        format!("URL: {}", req.account_url()),
        "Weigh these dimensions:".to_string(),
        "- writing register (formal, casual, informative, reflective)".to_string(),
        "- emoji frequency and style".to_string(),
        "- hashtag pattern".to_string(),
        "- how the account interacts with its audience".to_string(),
        "- brand personality".to_string(),
        format!("- idioms specific to {}", req.platform()),
        "Example: a corporate account is professional and informative, a personal blog is casual and reflective.".to_string(),
    ];
    if let Some(secondary) = req.secondary_url() {
        parts.push(format!(
            "Also consider {secondary} for context on the brand, its products and its campaigns."
        ));
    }
    match req.variant() {
        Variant::XOnly => parts.push("Answer in 150 characters or fewer.".to_string()),
        Variant::Generic => parts.push("Be concise.".to_string()),
    }
    parts.push(format!("Answer in {language}."));
    parts.join("\n")
}

pub fn system_prompt_posts() -> String {
    "You are a professional social media content creator. Produce six social media post drafts in the requested format. Always reply with JSON.".to_string()
}

pub fn user_prompt_posts(req: &GenerationRequest, tone: &str, language: &str) -> String {
    let platform = req.platform();
    let date = req.post_date();
    let limit = character_limit(platform, req.variant());

    let mut parts = vec![
        format!(
            "You are the social media manager of this account and a veteran {platform} marketer."
        ),
        "Using the information below, write six different post drafts.".to_string(),
        "# Context".to_string(),
        format!(
            "- Account URL: {} (infer the tone and manner from this account's past posts and follow it strictly)",
            req.account_url()
        ),
        format!("- Planned posting date: {}", date.format("%Y-%m-%d")),
        format!("- Platform: {platform}"),
        format!(
            "- Recommended tone and manner: \"{tone}\" (analysed in the previous step; follow it strictly)"
        ),
    ];

    if let Some(secondary) = req.secondary_url() {
        parts.push(format!("- Reference site: {secondary}"));
        parts.push(format!(
            "- Take product, service and campaign facts ONLY from {} and {secondary}. Never invent products or campaigns that are not listed there.",
            req.account_url()
        ));
    }
    if let Some(note) = req.user_note() {
        parts.push(format!("- Additional request from the user: {note}"));
    }

    parts.push("# Output format".to_string());
    parts.push(
        "Return the six drafts as a JSON array, exactly in the format below, one entry per category in this order:"
            .to_string(),
    );
    for label in category_labels(date) {
        parts.push(format!("- {label}"));
    }
    parts.push("Every draft must follow the given tone and manner and suit the platform.".to_string());
    parts.push("Posts must suit a general audience and stay positive or neutral.".to_string());
    parts.push(character_limit_directive(limit));
    parts.push(
        "Avoid heavy hashtag use unless it is natural for the tone or required by the platform."
            .to_string(),
    );
    parts.push(format!("Write every title and content in {language}."));
    parts.push(
        "Each object has exactly the keys \"title\" and \"content\"; keep the key names in English."
            .to_string(),
    );
    parts.push(json_template(date));
    parts.push("Follow the JSON structure above exactly. Do not include any other text.".to_string());

    parts.join("\n")
}

fn json_template(date: NaiveDate) -> String {
    let labels = category_labels(date);
    let hints = category_hints(date);
    let entries: Vec<String> = labels
        .iter()
        .zip(hints.iter())
        .map(|(title, content)| {
            format!(
                "  {{\n    \"title\": {},\n    \"content\": {}\n  }}",
                quote(title),
                quote(content)
            )
        })
        .collect();
    format!("```json\n[\n{}\n]\n```", entries.join(",\n"))
}

fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}
