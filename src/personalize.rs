//! Persona-aware rewriting of listing descriptions.
//!
//! The model is shown the questionnaire and the original description and
//! asked to return only a rewritten description that speaks to the user by
//! name and refers to their answers.

use crate::error::{HomeMatchError, Result};
use crate::llm::LanguageModel;
use crate::models::{search_answers, ListingMatch};
use crate::search::get_listings_from_query;
use crate::store::Collection;

/// Build the rewrite prompt. Questions and answers are embedded as JSON
/// arrays, in the order given.
pub fn build_personalization_prompt(
    description: &str,
    questions: &[String],
    answers: &[String],
) -> String {
    let questions = serde_json::to_string(questions).unwrap_or_default();
    let answers = serde_json::to_string(answers).unwrap_or_default();
    format!(
        "You are an AI that will rewrite the description for a property based on a user's \
         answers to some questions.\n\n\
         You've asked the following questions\n\n\
         {questions}\n\n\
         and received the following answers\n\n\
         {answers}\n\n\
         Construct a user persona for the user and personalize the following real estate \
         description so that it appeals to the user:\n\n\
         {description}\n\n\
         Make sure to use the user's name in the description so they feel special.\n\n\
         Make sure to mention particulars about their answers to the questions and how they \
         relate to the listing.\n\n\
         Make sure you only return the personalized description as this will be used in a \
         data object.\n"
    )
}

/// Rewrite `description` for the user described by the questionnaire.
///
/// The model's answer is used verbatim as the new description.
pub async fn get_personalized_descriptions(
    description: &str,
    questions: &[String],
    answers: &[String],
    model: &dyn LanguageModel,
) -> Result<String> {
    let prompt = build_personalization_prompt(description, questions, answers);
    model.invoke(&prompt).await
}

/// Retrieve the best listing for each answer after the introduction and
/// rewrite its description for the user.
///
/// Every rewrite sees the full questionnaire. Two answers that retrieve the
/// same listing produce two entries.
///
/// # Errors
///
/// [`HomeMatchError::EmptyResult`] if an answer matches no listing.
pub async fn get_personalized_listings(
    questions: &[String],
    answers: &[String],
    model: &dyn LanguageModel,
    collection: &dyn Collection,
) -> Result<Vec<ListingMatch>> {
    let search_answers = search_answers(answers);

    let mut listings = Vec::with_capacity(search_answers.len());
    for answer in search_answers {
        let best = get_listings_from_query(answer, collection, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| HomeMatchError::EmptyResult {
                query: answer.clone(),
            })?;
        listings.push(best);
    }

    for listing in &mut listings {
        listing.description =
            get_personalized_descriptions(&listing.description, questions, answers, model).await?;
        tracing::info!(listing_id = %listing.listing_id, "description personalized");
    }

    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FnModel;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_prompt_contains_inputs_verbatim() {
        let questions = strings(&["What's your name?", "How big is your family?"]);
        let answers = strings(&["I'm Priya", "Two kids and a dog"]);
        let description = "Spacious house with a fenced yard.";

        let prompt = build_personalization_prompt(description, &questions, &answers);
        assert!(prompt.contains(description));
        assert!(prompt.contains(&serde_json::to_string(&questions).unwrap()));
        assert!(prompt.contains(&serde_json::to_string(&answers).unwrap()));
        assert!(prompt.contains("user persona"));
        assert!(prompt.contains("only return the personalized description"));
    }

    #[tokio::test]
    async fn test_model_output_becomes_description() {
        let model = FnModel::new(|_: &str| Ok("  Priya, this home is for you.\n".to_string()));
        let out = get_personalized_descriptions("orig", &[], &[], &model)
            .await
            .unwrap();
        assert_eq!(out, "  Priya, this home is for you.\n");
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let model = FnModel::new(|_: &str| {
            Err(HomeMatchError::ModelInvocation("rate limited".to_string()))
        });
        let err = get_personalized_descriptions("orig", &[], &[], &model)
            .await
            .unwrap_err();
        assert!(matches!(err, HomeMatchError::ModelInvocation(_)));
    }
}
