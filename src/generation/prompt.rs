//! Prompt templates for RAG generation

use crate::types::{Message, RetrievedSource};

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the context block from ranked sources, each tagged with its
    /// source identity so the model can cite it
    pub fn build_context(sources: &[RetrievedSource]) -> String {
        if sources.is_empty() {
            return "No relevant context found.".to_string();
        }

        let mut context = String::new();
        for (i, source) in sources.iter().enumerate() {
            context.push_str(&format!(
                "[Source {}: {}]\n{}\n\n",
                i + 1,
                source.metadata.filename,
                source.content
            ));
        }
        context
    }

    /// Build the conversation for the generation API: a grounding system
    /// instruction plus the user turn carrying context and question
    pub fn build_messages(query: &str, sources: &[RetrievedSource]) -> Vec<Message> {
        let system = "You are a document-grounded assistant.\n\
            Answer using ONLY the information in the provided context.\n\
            Cite sources using the [Source N] format.\n\
            If the context does not contain the answer, say that the \
            information is not available in the uploaded documents instead \
            of guessing.";

        let user = format!(
            "Context:\n{}\nUser Question: {}\n\nAnswer the question using only the context above.",
            Self::build_context(sources),
            query
        );

        vec![Message::system(system), Message::user(user)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, Document, FileFormat, Role};

    fn source(filename: &str, content: &str, score: f32) -> RetrievedSource {
        let doc = Document::new(
            filename.to_string(),
            FileFormat::Txt,
            "hash".to_string(),
            content.to_string(),
            content.len() as u64,
        );
        let chunk = Chunk::new(&doc, content.to_string(), 0, 0, content.chars().count());
        RetrievedSource::from_chunk(&chunk, score)
    }

    #[test]
    fn test_context_tags_sources_in_rank_order() {
        let sources = vec![
            source("first.txt", "top ranked text", 0.9),
            source("second.txt", "runner up text", 0.7),
        ];
        let context = PromptBuilder::build_context(&sources);

        let first = context.find("[Source 1: first.txt]").unwrap();
        let second = context.find("[Source 2: second.txt]").unwrap();
        assert!(first < second);
        assert!(context.contains("top ranked text"));
        assert!(context.contains("runner up text"));
    }

    #[test]
    fn test_messages_carry_query_and_context() {
        let sources = vec![source("doc.txt", "relevant passage", 0.8)];
        let messages = PromptBuilder::build_messages("what is relevant?", &sources);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.contains("what is relevant?"));
        assert!(messages[1].content.contains("[Source 1: doc.txt]"));
    }

    #[test]
    fn test_empty_sources_still_build_a_prompt() {
        let context = PromptBuilder::build_context(&[]);
        assert_eq!(context, "No relevant context found.");
    }
}
