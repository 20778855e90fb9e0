// Shared prompt fragments. Each feature module keeps its own prompts.rs
// alongside it; this file holds only what the client itself sends.

/// Prefix of the user message that carries the serialized caller payload.
pub const JSON_PAYLOAD_PREAMBLE: &str =
    "Here is the data in JSON format. Respond ONLY with valid JSON as specified previously.\n";

