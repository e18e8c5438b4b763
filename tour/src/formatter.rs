use colored::*;
use std::fmt::Display;
use tour_core::{
    blog::BlogCallError,
    connection::ConnectError,
    greet::DeadlineOutcome,
    proto::blog::Blog,
    stream::{BidiOutcome, StreamError},
    tonic::Status,
};

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

/// A single result line, prefixed with the call it came from.
pub struct CallResult<'a, T: Display>(pub &'a str, pub T);

pub struct GenericError<T: Display>(pub &'static str, pub T);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", self.0)?;
        Ok(())
    }
}

impl From<Status> for FormattedString {
    fn from(status: Status) -> Self {
        FormattedString(format!(
            "{} code={:?} message={:?}",
            "gRPC Failed:".red().bold(),
            status.code(),
            status.message()
        ))
    }
}

impl From<ConnectError> for FormattedString {
    fn from(err: ConnectError) -> Self {
        FormattedString(format!("{}\n\n'{}'", "Connection Error:".red().bold(), err))
    }
}

impl From<StreamError> for FormattedString {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Open(status) | StreamError::Receive { status, .. } => {
                FormattedString::from(status)
            }
            StreamError::Cancelled { received } => FormattedString(format!(
                "{} after {} response(s)",
                "Stream cancelled".yellow().bold(),
                received
            )),
            err @ StreamError::SendTask(_) => {
                FormattedString(format!("{}\n\n'{}'", "Stream Failed:".red().bold(), err))
            }
        }
    }
}

impl From<BlogCallError> for FormattedString {
    fn from(err: BlogCallError) -> Self {
        match err {
            BlogCallError::Status(status) => FormattedString::from(status),
            err @ BlogCallError::MissingBlog => {
                FormattedString(format!("{}\n\n'{}'", "Call Failed:".red().bold(), err))
            }
        }
    }
}

impl<T: Display> From<GenericError<T>> for FormattedString {
    fn from(GenericError(msg, err): GenericError<T>) -> Self {
        FormattedString(format!("{}:\n\n'{}'", msg.red().bold(), err))
    }
}

impl<T: Display> From<CallResult<'_, T>> for FormattedString {
    fn from(CallResult(call, value): CallResult<'_, T>) -> Self {
        FormattedString(format!("{} {}", format!("{call}:").cyan(), value))
    }
}

impl From<DeadlineOutcome> for FormattedString {
    fn from(outcome: DeadlineOutcome) -> Self {
        match outcome {
            DeadlineOutcome::Completed(result) => {
                FormattedString::from(CallResult("GreetWithDeadline", result))
            }
            DeadlineOutcome::DeadlineExceeded => FormattedString(format!(
                "{} deadline was exceeded",
                "Timeout was hit!".yellow().bold()
            )),
        }
    }
}

impl From<&BidiOutcome<String>> for FormattedString {
    fn from(outcome: &BidiOutcome<String>) -> Self {
        FormattedString(format!(
            "{} sent {} request(s), received {} response(s)",
            "GreetEveryone finished:".green().bold(),
            outcome.sent,
            outcome.received.len()
        ))
    }
}

impl From<&Blog> for FormattedString {
    fn from(blog: &Blog) -> Self {
        let mut out = String::new();
        out.push_str(&format!("{} {} {{\n", "blog".cyan(), blog.id.green()));
        out.push_str(&format!("  {} {}\n", "author:".yellow(), blog.author_id));
        out.push_str(&format!("  {} {}\n", "title:".yellow(), blog.title));
        out.push_str(&format!("  {} {}\n", "content:".yellow(), blog.content));
        out.push('}');
        FormattedString(out)
    }
}

pub struct LabelledBlog<'a>(pub &'a str, pub &'a Blog);

impl From<LabelledBlog<'_>> for FormattedString {
    fn from(LabelledBlog(label, blog): LabelledBlog<'_>) -> Self {
        let FormattedString(body) = FormattedString::from(blog);
        FormattedString(format!("{}\n{}", label.green().bold(), body))
    }
}

pub struct BlogList<'a>(pub &'a [Blog]);

impl From<BlogList<'_>> for FormattedString {
    fn from(BlogList(blogs): BlogList<'_>) -> Self {
        if blogs.is_empty() {
            return FormattedString("No blogs found.".yellow().to_string());
        }

        FormattedString(format!("{} {}", "Blogs listed:".green().bold(), blogs.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blog_lists_every_field() {
        colored::control::set_override(false);

        let blog = Blog {
            id: "b1".to_string(),
            author_id: "ada".to_string(),
            title: "Notes".to_string(),
            content: "Engines".to_string(),
        };

        let FormattedString(out) = FormattedString::from(&blog);

        assert_eq!(
            out,
            "blog b1 {\n  author: ada\n  title: Notes\n  content: Engines\n}"
        );
    }

    #[test]
    fn test_cancelled_stream_reports_progress() {
        colored::control::set_override(false);

        let FormattedString(out) = FormattedString::from(StreamError::Cancelled { received: 3 });

        assert_eq!(out, "Stream cancelled after 3 response(s)");
    }

    #[test]
    fn test_deadline_exceeded() {
        colored::control::set_override(false);

        let FormattedString(out) = FormattedString::from(DeadlineOutcome::DeadlineExceeded);

        assert_eq!(out, "Timeout was hit! deadline was exceeded");
    }
}
