use chrono::NaiveDate;
use contentport_persist::{AccountProfile, Style, WebsiteContent};
use contentport_types::DraftTweet;

use super::xml::XmlPrompt;

/// Separator between tweets of a thread in writer output
pub const THREAD_SEPARATOR: &str = "---";

pub const ENHANCE_PROMPT_SYSTEM: &str = "You rewrite prompts for a tweet-writing assistant. \
Make the user's prompt clearer and more specific so another model can turn it into a strong tweet or thread. \
Never answer or fulfil the request yourself; return only the rewritten prompt, without quotes or commentary.

Rules:
1. Be specific: topic, goal, number of tweets.
2. Add Twitter context: tone (professional, casual, witty), format (single tweet, thread), audience.
3. State the expected format, e.g. a 3-part thread or a tweet ending in a question.
4. Add constraints: under 280 characters per tweet, hashtags only when they help, a call to action when fitting.
5. Keep the user's intent.

If the prompt is already specific, return it with at most small refinements. \
If it is too vague to improve (\"hello\", \"fix this\"), ask for clarification instead.";

/// User content of the prompt-enhancement request
pub fn enhance_prompt_request(text: &str) -> String {
    format!("Original prompt: \"{}\"\n\n", text)
}

/// The user's chat turn as sent to the model
pub fn user_turn(
    user_message: &str,
    links: &[String],
    drafts: &[DraftTweet],
    today: NaiveDate,
) -> String {
    let mut prompt = XmlPrompt::new();
    prompt.open("message", &[("date", today.format("%A, %Y-%m-%d").to_string())]);
    prompt.tag("user_message", user_message, &[]);

    let links: Vec<&String> = links.iter().filter(|link| !link.is_empty()).collect();
    if !links.is_empty() {
        prompt.open("attached_links", &[("note", "please read these links.".into())]);
        for link in links {
            prompt.tag("link", link, &[]);
        }
        prompt.close("attached_links");
    }

    match drafts {
        [] => {}
        [draft] => {
            prompt.tag("tweet_draft", &draft.content, &[]);
        }
        drafts => {
            prompt.open("thread_draft", &[("note", "please read this thread.".into())]);
            for draft in drafts {
                prompt.tag("tweet_draft", &draft.content, &[("index", draft.index.to_string())]);
            }
            prompt.close("thread_draft");
        }
    }

    prompt.close("message");
    prompt.to_string()
}

pub fn assistant_prompt(drafts: &[DraftTweet]) -> String {
    let mut prompt = XmlPrompt::new();
    prompt.open("system", &[]);
    prompt.text(
        "You are Contentport's assistant. You help the user write tweets and threads for their \
         Twitter account in their own voice.",
    );

    prompt.open("tools", &[]);
    prompt.tag(
        "tool",
        "Writes or edits tweets. Call it whenever the user wants tweet text created or changed. \
         The user sees its output directly, so never repeat the tweet in your reply.",
        &[("name", "writeTweet".into())],
    );
    prompt.tag(
        "tool",
        "Reads a web page or a tweet. Call it for every link in <attached_links> before writing.",
        &[("name", "readWebsiteContent".into())],
    );
    prompt.close("tools");

    prompt.open("rules", &[]);
    prompt.tag("rule", "Read attached links first, then write.", &[]);
    prompt.tag("rule", "Call writeTweet at most once per user message.", &[]);
    prompt.tag(
        "rule",
        "After writing, reply with one short sentence. Do not explain your choices.",
        &[],
    );
    prompt.tag(
        "rule",
        "If the request has nothing to do with tweets, answer briefly and plainly.",
        &[],
    );
    prompt.close("rules");

    if !drafts.is_empty() {
        prompt.tag(
            "editor_state",
            &format!(
                "The user has {} tweet draft(s) open in the editor. Edits to tweets refer to these drafts.",
                drafts.len()
            ),
            &[],
        );
    }

    prompt.close("system");
    prompt.to_string()
}

/// System prompt of the tweet writer, conditioned on the account's style
pub fn tweet_writer_prompt(style: Option<&Style>, account: Option<&AccountProfile>) -> String {
    let mut prompt = XmlPrompt::new();
    prompt.open("system", &[]);
    prompt.text(
        "You write tweets. Output only the tweet text: no preamble, no quotes, no labels.",
    );

    prompt.open("rules", &[]);
    prompt.tag("rule", "Each tweet stays under 280 characters.", &[]);
    prompt.tag(
        "rule",
        &format!(
            "For a thread, put a line containing only {} between tweets.",
            THREAD_SEPARATOR
        ),
        &[],
    );
    prompt.tag("rule", "No hashtags or emojis unless the user asks for them.", &[]);
    prompt.tag(
        "rule",
        "When editing a draft, change only what the instruction asks for.",
        &[],
    );
    prompt.close("rules");

    if let Some(account) = account {
        prompt.tag(
            "account",
            &format!("{} (@{})", account.name, account.username),
            &[("verified", account.verified.to_string())],
        );
    }

    if let Some(style) = style {
        if !style.tweets.is_empty() || style.prompt.is_some() {
            prompt.open(
                "style",
                &[("note", "match the voice of these tweets.".into())],
            );
            for tweet in &style.tweets {
                let author = tweet
                    .author
                    .as_ref()
                    .map(|author| author.username.clone())
                    .unwrap_or_default();
                prompt.tag("example_tweet", &tweet.text, &[("author", author)]);
            }
            if let Some(custom) = style.prompt.as_deref().filter(|p| !p.trim().is_empty()) {
                prompt.tag("custom_instructions", custom, &[]);
            }
            prompt.close("style");
        }
    }

    prompt.close("system");
    prompt.to_string()
}

/// User content of the tweet writer request
pub fn writer_request(
    instruction: &str,
    user_message: &str,
    drafts: &[DraftTweet],
    websites: &[WebsiteContent],
) -> String {
    let mut prompt = XmlPrompt::new();
    prompt.tag("instruction", instruction, &[]);
    if user_message != instruction {
        prompt.tag("user_message", user_message, &[]);
    }

    if !drafts.is_empty() {
        prompt.open("current_draft", &[]);
        for draft in drafts {
            prompt.tag("tweet", &draft.content, &[("index", draft.index.to_string())]);
        }
        prompt.close("current_draft");
    }

    if !websites.is_empty() {
        prompt.open("website_contents", &[]);
        for website in websites {
            prompt.open(
                "website",
                &[("url", website.url.clone()), ("title", website.title.clone())],
            );
            prompt.text(&website.content);
            prompt.close("website");
        }
        prompt.close("website_contents");
    }

    prompt.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentport_persist::{StyleTweet, TweetAuthor};

    fn draft(index: u32, content: &str) -> DraftTweet {
        DraftTweet {
            id: format!("t{}", index),
            index,
            content: content.into(),
            media: Vec::new(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 3).unwrap()
    }

    #[test]
    fn test_user_turn_plain() {
        let turn = user_turn("write about rust", &[], &[], date());
        assert_eq!(
            turn,
            "<message date=\"Friday, 2025-01-03\">\n\
             <user_message>write about rust</user_message>\n\
             </message>"
        );
    }

    #[test]
    fn test_user_turn_with_links_and_single_draft() {
        let turn = user_turn(
            "improve this",
            &["https://blog.example/post".into()],
            &[draft(0, "my draft")],
            date(),
        );

        assert!(turn.contains("<attached_links note=\"please read these links.\">"));
        assert!(turn.contains("<link>https://blog.example/post</link>"));
        assert!(turn.contains("<tweet_draft>my draft</tweet_draft>"));
        assert!(!turn.contains("thread_draft"));
    }

    #[test]
    fn test_user_turn_with_thread() {
        let turn = user_turn("tighten", &[], &[draft(0, "one"), draft(1, "two")], date());

        assert!(turn.contains("<thread_draft note=\"please read this thread.\">"));
        assert!(turn.contains("<tweet_draft index=\"0\">one</tweet_draft>"));
        assert!(turn.contains("<tweet_draft index=\"1\">two</tweet_draft>"));
    }

    #[test]
    fn test_writer_prompt_includes_style() {
        let style = Style {
            tweets: vec![StyleTweet {
                id: "1".into(),
                text: "ship small, ship often".into(),
                author_id: None,
                created_at: None,
                edit_history_tweet_ids: Vec::new(),
                author: Some(TweetAuthor {
                    username: "writer".into(),
                    name: "Writer".into(),
                    profile_image_url: None,
                }),
            }],
            prompt: Some("lowercase only".into()),
        };

        let prompt = tweet_writer_prompt(Some(&style), None);
        assert!(prompt.contains("<example_tweet author=\"writer\">ship small, ship often</example_tweet>"));
        assert!(prompt.contains("<custom_instructions>lowercase only</custom_instructions>"));
    }

    #[test]
    fn test_writer_prompt_without_style() {
        let prompt = tweet_writer_prompt(None, None);
        assert!(!prompt.contains("<style"));
    }

    #[test]
    fn test_enhance_request_quotes_text() {
        assert_eq!(enhance_prompt_request("rust"), "Original prompt: \"rust\"\n\n");
    }
}
