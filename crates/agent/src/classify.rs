#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnKind {
    Chat,
    BuildingAnalysis,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewReply {
    AcceptBom,
    DismissBom,
    Other,
}

/// Keyword-heuristic classification of the user's latest input. Deliberately
/// coarse: a false `Chat` costs nothing (the model can still recommend
/// items), while a false `BuildingAnalysis` only produces an empty bill.
pub fn classify_turn(text: &str) -> TurnKind {
    let normalized = normalize_text(text);

    let project_phrases = [
        "bill of materials",
        "materials list",
        "list of materials",
        "what do i need to build",
        "what would i need",
        "planning to build",
        "want to build",
        "building a",
        "build a",
        "build an",
        "construct",
        "renovat",
        "remodel",
    ];
    if project_phrases.iter().any(|phrase| normalized.contains(phrase)) {
        return TurnKind::BuildingAnalysis;
    }

    let project_nouns =
        ["shed", "garage", "deck", "fence", "pergola", "gazebo", "extension", "treehouse"];
    let mentions_project = project_nouns.iter().any(|noun| normalized.contains(noun));
    let mentions_intent = ["build", "building", "need materials", "supplies for"]
        .iter()
        .any(|hint| normalized.contains(hint));
    if mentions_project && mentions_intent {
        return TurnKind::BuildingAnalysis;
    }

    TurnKind::Chat
}

/// Classifies a reply while a bill of materials is pending. Dismissal wins
/// over acceptance so "no, don't add them" never reads as an accept.
pub fn classify_preview_reply(text: &str) -> PreviewReply {
    let normalized = normalize_text(text);
    let tokens = tokenize(&normalized);

    let dismiss_phrases = ["no thanks", "never mind", "nevermind", "not now", "don't add", "do not add"];
    let dismiss_tokens = ["dismiss", "no", "cancel", "skip", "discard"];
    if dismiss_phrases.iter().any(|phrase| normalized.contains(phrase))
        || dismiss_tokens.iter().any(|token| tokens.iter().any(|t| t == token))
    {
        return PreviewReply::DismissBom;
    }

    let accept_phrases =
        ["add all", "add them", "add everything", "add it all", "looks good", "go ahead"];
    let accept_tokens = ["yes", "accept", "approve", "sure", "ok", "okay"];
    if accept_phrases.iter().any(|phrase| normalized.contains(phrase))
        || accept_tokens.iter().any(|token| tokens.iter().any(|t| t == token))
    {
        return PreviewReply::AcceptBom;
    }

    PreviewReply::Other
}

fn normalize_text(text: &str) -> String {
    text.to_ascii_lowercase()
}

fn tokenize(normalized: &str) -> Vec<String> {
    normalized
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '\'')
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
        .collect()
}
