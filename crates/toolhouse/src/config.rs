/// Builder for [`ToolhouseConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ToolhouseConfigBuilder {
    agent_url: String,
}

impl ToolhouseConfigBuilder {
    /// Creates a builder with the URL of the deployed agent.
    ///
    /// The URL identifies one agent; session-continuation calls address
    /// `<agent URL>/<token>` under it.
    #[inline]
    pub fn with_agent_url<S: Into<String>>(agent_url: S) -> Self {
        Self {
            agent_url: agent_url.into(),
        }
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> ToolhouseConfig {
        ToolhouseConfig {
            agent_url: self.agent_url.trim_end_matches('/').to_owned(),
        }
    }
}

/// Configuration for the Toolhouse backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ToolhouseConfig {
    agent_url: String,
}

impl ToolhouseConfig {
    /// Returns the agent endpoint URL, without a trailing slash.
    #[inline]
    pub fn agent_url(&self) -> &str {
        &self.agent_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_stripped() {
        let config = ToolhouseConfigBuilder::with_agent_url(
            "https://agents.example.com/abc/",
        )
        .build();
        assert_eq!(config.agent_url(), "https://agents.example.com/abc");
    }
}
