//! Structured chat responses produced by commands

/// Intended audience of a [`CommandResponse`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Recipient {
    /// Visible to the whole table
    All,
    /// Whispered to the game master
    Gm,
    /// Whispered back to whoever sent the command
    #[default]
    Sender,
    /// Whispered to the named player
    Player(String),
}

/// A chat response to be rendered and delivered by the sandbox adapter
///
/// `text` holds one paragraph per entry. `speaker` of `None` defers to the
/// configured default name at send time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    text: Vec<String>,
    recipient: Recipient,
    style: String,
    speaker: Option<String>,
}

impl CommandResponse {
    /// Create a response whispered back to the sender, with no extra style
    pub fn new(text: impl Into<ResponseText>) -> Self {
        Self {
            text: text.into().0,
            recipient: Recipient::Sender,
            style: String::new(),
            speaker: None,
        }
    }

    pub fn with_recipient(mut self, recipient: Recipient) -> Self {
        self.recipient = recipient;
        self
    }

    /// Extra inline style rules appended to the base style on HTML output
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.text
    }

    pub fn recipient(&self) -> &Recipient {
        &self.recipient
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn speaker(&self) -> Option<&str> {
        self.speaker.as_deref()
    }
}

/// Response body: a single line or an ordered sequence of paragraphs
pub struct ResponseText(Vec<String>);

impl From<String> for ResponseText {
    fn from(text: String) -> Self {
        Self(vec![text])
    }
}

impl From<&str> for ResponseText {
    fn from(text: &str) -> Self {
        Self(vec![text.to_string()])
    }
}

impl From<Vec<String>> for ResponseText {
    fn from(lines: Vec<String>) -> Self {
        Self(lines)
    }
}

/// What a command hands back: one response or an ordered sequence of them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    One(CommandResponse),
    Many(Vec<CommandResponse>),
}

impl CommandReply {
    pub fn as_slice(&self) -> &[CommandResponse] {
        match self {
            Self::One(response) => std::slice::from_ref(response),
            Self::Many(responses) => responses,
        }
    }

    pub fn into_vec(self) -> Vec<CommandResponse> {
        match self {
            Self::One(response) => vec![response],
            Self::Many(responses) => responses,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl From<CommandResponse> for CommandReply {
    fn from(response: CommandResponse) -> Self {
        Self::One(response)
    }
}

impl From<Vec<CommandResponse>> for CommandReply {
    fn from(responses: Vec<CommandResponse>) -> Self {
        Self::Many(responses)
    }
}
