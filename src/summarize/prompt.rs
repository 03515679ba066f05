//! Prompt construction for the activity summary.

use crate::github::models::{CommitRecord, IssueOrPrRecord, ItemKind};

const SYSTEM_PROMPT: &str = r"You are an expert software engineer analyzing GitHub activity to provide concise, technical summaries of developers' contributions. Your goal is to extract the essence of a user's work, focusing on the main features and significant fixes.

You will be given the GitHub activity for a user to analyze this activity and provide a brief, technical summary of their contributions. Organize the most important and active repositories first.

Break down the information inside <contribution_breakdown> tags. Here are some guidelines:
1. Summarize the overall focus of the user's work based on this breakdown
2. Keep it short and concise
3. Use hyperlinks to commits, repositories, issues, and pull requests for clarity. Do NOT repeat hyperlinks, its ugly. Make sure you have the full link.
4. Focus on technical details of main features and fixes
5. Use bullet points for clarity
6. Do NOT mention the number of commits
7. Do NOT use bullet points inside list items

Format your summary in markdown. An example structure would be:

<contribution_breakdown>
### [`username/repository_name`](link)
- [Fixed bug](link to bug) related to XYZ in [repository](link to repository)
- Added XYZ feature to [repository](link)
- [Reported bug](link to issue) related to XYZ
</contribution_breakdown>";

/// The system and user prompts rendered from one run's activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityPrompt {
    system: String,
    user: String,
}

impl ActivityPrompt {
    /// Renders prompts for the given activity.
    #[must_use]
    pub fn new(commits: &[CommitRecord], issues_and_prs: &[IssueOrPrRecord], actor: &str) -> Self {
        let commits_text = render_commits(commits);
        let issues_text = render_issues(issues_and_prs);

        let user = format!(
            "Here is the GitHub activity for {actor}:\n\n\
             <commits>\n{commits_text}\n</commits>\n\n\
             <issues_and_prs>\n{issues_text}\n</issues_and_prs>\n\n\
             Remember to keep your summary technical, concise, and focused on \
             the most significant contributions. Avoid verbosity and ensure \
             each point provides valuable insight into the user's work."
        );

        Self {
            system: SYSTEM_PROMPT.to_owned(),
            user,
        }
    }

    /// Borrow the system prompt.
    #[must_use]
    pub fn system(&self) -> &str {
        self.system.as_str()
    }

    /// Borrow the user prompt.
    #[must_use]
    pub fn user(&self) -> &str {
        self.user.as_str()
    }

    /// Renders both prompts as one message for providers without a system
    /// role, with the closing instruction the original flow appends.
    #[must_use]
    pub fn combined(&self) -> String {
        format!(
            "{system}\n\n{user}\n\nRespond with <contribution_breakdown> tags as specified.",
            system = self.system,
            user = self.user
        )
    }
}

fn render_commits(commits: &[CommitRecord]) -> String {
    let entries: Vec<String> = commits
        .iter()
        .map(|commit| {
            format!(
                "Repository: {repository}\nMessage: {message}",
                repository = commit.repository.name_with_owner,
                message = commit.message_headline
            )
        })
        .collect();
    entries.join("\n---\n")
}

fn render_issues(items: &[IssueOrPrRecord]) -> String {
    let entries: Vec<String> = items
        .iter()
        .map(|item| {
            let kind = match item.kind {
                ItemKind::Issue => "ISSUE",
                ItemKind::Pr => "PR",
            };
            format!(
                "Type: {kind}\nRepository: {repository}\nTitle: {title}\nState: {state}\nNumber: #{number}",
                repository = item.repository.name_with_owner,
                title = item.title,
                state = item.state,
                number = item.number
            )
        })
        .collect();
    entries.join("\n---\n")
}
