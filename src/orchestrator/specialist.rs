//! Specialist configurations
//!
//! Each specialist is a system instruction plus a tool subset. The routing
//! call labels a request with one of these; anything unrecognized lands on
//! the plain chat assistant.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Specialist {
    /// Math, code, logic: solves by writing and running python
    Professor,
    /// News, facts, current events: searches the web
    Researcher,
    /// Images and diagrams: builds render URLs
    Artist,
    /// Everything else
    Chat,
}

impl Specialist {
    /// Match a routing reply to a specialist. Containment, not equality;
    /// the routing reply may pad the label. First hit wins.
    pub fn from_decision(decision: &str) -> Self {
        let decision = decision.to_uppercase();
        if decision.contains("PROFESSOR") {
            Self::Professor
        } else if decision.contains("RESEARCHER") {
            Self::Researcher
        } else if decision.contains("ARTIST") {
            Self::Artist
        } else {
            Self::Chat
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Professor => "Professor",
            Self::Researcher => "Researcher",
            Self::Artist => "Artist",
            Self::Chat => "Chat",
        }
    }

    /// System instruction for the delegated call
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Professor => {
                "You are a Python expert. Solve problems by WRITING and RUNNING \
                 code with the run_python tool, then explain the result."
            }
            Self::Researcher => {
                "You are a fact checker. Use the web_search tool to find \
                 real-time information, then summarize it with sources."
            }
            Self::Artist => {
                "You are a designer.\n\
                 1. Call generate_image with a detailed prompt describing the visual.\n\
                 2. The tool returns a string starting with 'IMAGE_GENERATED:'.\n\
                 3. You MUST include that EXACT string, unchanged, in your final \
                 reply so the client can render the image. Do not reword it or \
                 show only the link."
            }
            Self::Chat => "You are a helpful AI assistant.",
        }
    }

    /// Tools available to the delegated call
    pub fn tool_names(&self) -> &'static [&'static str] {
        match self {
            Self::Professor => &["run_python"],
            Self::Researcher => &["web_search"],
            Self::Artist => &["generate_image"],
            Self::Chat => &[],
        }
    }
}
