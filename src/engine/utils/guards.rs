// src/engine/utils/guards.rs
// Access gate evaluation for item resolution.

use crate::api::ResolveCredentials;
use crate::error::ShareError;
use crate::models::common::Timestamp;
use crate::models::item::Item;
use crate::utils::crypto;

/// Evaluates every configured gate for `item` against the supplied
/// credentials and clock. Pure: no side effects, no view-count mutation.
///
/// Gate order is fixed so denial precedence is deterministic:
/// expiry, quota, delayed release, quiz, password. The caller has already
/// established existence by loading the item. A locked item is denied
/// before its quiz or password gate is ever consulted, so neither the quiz
/// question nor the password requirement leaks ahead of the unlock time.
///
/// The quota check here is a pre-check only; the store's conditional
/// increment remains the final authority on consumption.
pub fn evaluate_access(
    item: &Item,
    credentials: &ResolveCredentials,
    now: Timestamp,
) -> Result<(), ShareError> {
    if let Some(expires_at) = item.expires_at {
        if now > expires_at {
            return Err(ShareError::Expired);
        }
    }

    if let Some(limit) = item.view_limit {
        if item.view_count >= limit {
            return Err(ShareError::QuotaExhausted);
        }
    }

    if let Some(unlock_at) = item.unlock_at {
        if now < unlock_at {
            return Err(ShareError::Locked(unlock_at));
        }
    }

    if let Some(answer_hash) = &item.quiz_answer_hash {
        let verified = credentials
            .quiz_answer
            .as_deref()
            .map(crypto::normalize_answer)
            .map(|answer| crypto::verify_credential(&answer, answer_hash))
            .unwrap_or(false);
        if !verified {
            return Err(ShareError::QuizFailed);
        }
    }

    if let Some(password_hash) = &item.password_hash {
        match credentials.password.as_deref() {
            None => return Err(ShareError::PasswordRequired),
            Some(password) if !crypto::verify_credential(password, password_hash) => {
                return Err(ShareError::PasswordInvalid);
            }
            Some(_) => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::ContentKind;
    use crate::models::item::ContentRef;

    const NOW: Timestamp = 1_700_000_000;

    fn plain_item() -> Item {
        Item {
            internal_id: 1,
            short_id: "abc1234".to_string(),
            secondary_id: "xyz9876".to_string(),
            name: "note".to_string(),
            content: ContentRef::Inline {
                kind: ContentKind::Text,
                body: "body".to_string(),
            },
            password_hash: None,
            quiz_question: None,
            quiz_answer_hash: None,
            unlock_at: None,
            expires_at: None,
            view_limit: None,
            view_count: 0,
            owner_token: "token".to_string(),
            created_at: NOW - 100,
        }
    }

    fn creds(password: Option<&str>, quiz_answer: Option<&str>) -> ResolveCredentials {
        ResolveCredentials {
            password: password.map(str::to_string),
            quiz_answer: quiz_answer.map(str::to_string),
        }
    }

    #[test]
    fn ungated_item_is_allowed() {
        assert_eq!(evaluate_access(&plain_item(), &creds(None, None), NOW), Ok(()));
    }

    #[test]
    fn expiry_wins_even_with_correct_password() {
        let mut item = plain_item();
        item.expires_at = Some(NOW - 1);
        item.password_hash = Some(crypto::hash_credential("P@ss1234"));
        let result = evaluate_access(&item, &creds(Some("P@ss1234"), None), NOW);
        assert_eq!(result, Err(ShareError::Expired));
    }

    #[test]
    fn expiry_is_inclusive_of_the_deadline_second() {
        let mut item = plain_item();
        item.expires_at = Some(NOW);
        assert_eq!(evaluate_access(&item, &creds(None, None), NOW), Ok(()));
    }

    #[test]
    fn quota_precheck_denies_exhausted_item() {
        let mut item = plain_item();
        item.view_limit = Some(3);
        item.view_count = 3;
        let result = evaluate_access(&item, &creds(None, None), NOW);
        assert_eq!(result, Err(ShareError::QuotaExhausted));
    }

    #[test]
    fn locked_item_never_reaches_quiz_or_password() {
        let mut item = plain_item();
        item.unlock_at = Some(NOW + 3600);
        item.quiz_question = Some("color?".to_string());
        item.quiz_answer_hash = Some(crypto::hash_credential("blue"));
        item.password_hash = Some(crypto::hash_credential("pw"));
        let result = evaluate_access(&item, &creds(None, None), NOW);
        assert_eq!(result, Err(ShareError::Locked(NOW + 3600)));
    }

    #[test]
    fn correct_quiz_still_requires_password() {
        let mut item = plain_item();
        item.quiz_question = Some("color?".to_string());
        item.quiz_answer_hash = Some(crypto::hash_credential("blue"));
        item.password_hash = Some(crypto::hash_credential("P@ss1234"));
        let result = evaluate_access(&item, &creds(None, Some("blue")), NOW);
        assert_eq!(result, Err(ShareError::PasswordRequired));
    }

    #[test]
    fn quiz_answer_is_trimmed_and_case_insensitive() {
        let mut item = plain_item();
        item.quiz_answer_hash = Some(crypto::hash_credential("blue"));
        assert_eq!(
            evaluate_access(&item, &creds(None, Some("  BLUE \n")), NOW),
            Ok(())
        );
    }

    #[test]
    fn wrong_or_missing_quiz_answer_fails() {
        let mut item = plain_item();
        item.quiz_answer_hash = Some(crypto::hash_credential("blue"));
        assert_eq!(
            evaluate_access(&item, &creds(None, Some("red")), NOW),
            Err(ShareError::QuizFailed)
        );
        assert_eq!(
            evaluate_access(&item, &creds(None, None), NOW),
            Err(ShareError::QuizFailed)
        );
    }

    #[test]
    fn password_gate_distinguishes_missing_from_wrong() {
        let mut item = plain_item();
        item.password_hash = Some(crypto::hash_credential("P@ss1234"));
        assert_eq!(
            evaluate_access(&item, &creds(None, None), NOW),
            Err(ShareError::PasswordRequired)
        );
        assert_eq!(
            evaluate_access(&item, &creds(Some("wrong"), None), NOW),
            Err(ShareError::PasswordInvalid)
        );
        assert_eq!(
            evaluate_access(&item, &creds(Some("P@ss1234"), None), NOW),
            Ok(())
        );
    }

    #[test]
    fn unlocked_item_with_satisfied_gates_is_allowed() {
        let mut item = plain_item();
        item.unlock_at = Some(NOW - 10);
        item.expires_at = Some(NOW + 10);
        item.view_limit = Some(5);
        item.view_count = 4;
        assert_eq!(evaluate_access(&item, &creds(None, None), NOW), Ok(()));
    }
}
