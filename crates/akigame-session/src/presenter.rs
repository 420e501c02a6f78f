//! Player-facing texts and the guess card.

use akigame_core::oracle::Guess;
use akigame_core::transport::{Embed, EmbedFooter, User};

/// How to answer, shown when a game starts and by the help command.
pub const ANSWER_NOTICE: &str = "To answer a question, you can use the following terms:\n\
- \"yes\" OR \"y\" OR \"0\" for answering \"Yes\".\n\
- \"no\" OR \"n\" OR \"1\" for answer \"No\".\n\
- \"i\" OR \"idk\" OR \"i dont know\" OR \"i don't know\" OR \"2\" for answer \"I don't know\".\n\
- \"probably\" OR \"p\" OR \"3\" for answering \"Probably\".\n\
- \"probably not\" OR \"pn\" OR \"4\" for answering \"Probably not\".\n\n\
You can also say \"b\" or \"back\" to change your last question.";

/// Readiness prompt.
pub const READY_PROMPT: &str = "Are you ready to answer Akinator's questions? (y/n)";

/// Sent when the player is not ready.
pub const FAREWELL: &str = "See you later then! \u{1F44B}";

/// Language prompt.
pub const LANGUAGE_PROMPT: &str = "Do you wish to set a specific language? If so, please specify \
it now, else just say 'no'.";

/// The question message after the player stopped answering.
pub const NO_ANSWER: &str = "You haven't answered me... Think about it next time. \u{1F614}";

/// The question message after the game was cancelled.
pub const CANCELLED: &str = "Successfully cancelled. \u{1F60C}";

/// `back` on the first question.
pub const CANNOT_GO_BACK: &str = "Cannot go back any further! You will have to answer my question.";

/// The oracle returned garbage; the question is asked again.
pub const UNEXPECTED_ERROR: &str = "An unexpected error happened.";

/// The oracle ran out of questions.
pub const NO_QUESTIONS_LEFT: &str = "Oops! I ran out of questions! Trying to win...";

/// The player confirmed the guess.
pub const WON: &str = "I won! I'm so glad I guessed your mind!";

/// The player rejected the guess.
pub const LOST: &str = "Awh, that's bad... But feel free to ask me for another person, I don't \
mind you.";

/// The player never said whether the guess was right.
pub const UNDETERMINED: &str = "I hope I won then, at least. \u{1F629}";

/// Fallback colour when no random colour can be drawn.
pub const DEFAULT_COLOUR: u32 = 0x00_5B_C0;

/// Largest valid `0xRRGGBB` value.
pub const MAX_COLOUR: u32 = 0xFF_FF_FF;

/// Formats a question line, e.g. `Question #3: Is your character real?`.
#[must_use]
pub fn question_text(number: u32, question: &str) -> String {
    format!("Question #{number}: {question}")
}

/// Builds the card revealing the oracle's guess. `question_number` is the
/// counter shown in the question lines at the moment of the guess.
#[must_use]
pub fn guess_embed(guess: &Guess, player: &User, question_number: u32, colour: u32) -> Embed {
    Embed {
        title: "Hmm... I think I've guessed...".to_owned(),
        description: format!(
            "Is it {name}? Did I win? The description is {description}.",
            name = guess.name,
            description = guess.description,
        ),
        image_url: Some(guess.image_ref.clone()).filter(|url| !url.is_empty()),
        footer: Some(EmbedFooter {
            text: format!(
                "Game running for {name}. I asked over {question_number} questions! (v{version})",
                name = player.name,
                version = env!("CARGO_PKG_VERSION"),
            ),
            icon_url: player.avatar_url.clone(),
        }),
        colour: colour.min(MAX_COLOUR),
    }
}
