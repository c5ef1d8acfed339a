/// Branch evaluation for score checks and checkpoints.
///
/// Pure functions of (scene, ledger): no side effects, first match wins,
/// and a requirement is either fully met or not at all.
use thiserror::Error;

use crate::core::ledger::ScoreLedger;
use crate::schema::scene::{Destination, Scene, SceneBody};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BranchError {
    #[error("scene '{scene}' is a {kind} scene, not a branch")]
    NotABranch { scene: String, kind: &'static str },
    #[error("score check '{0}' matched no condition and declares no default")]
    NoMatchingCondition(String),
}

/// Pick the destination of a score check or checkpoint scene.
pub fn evaluate<'a>(scene: &'a Scene, ledger: &ScoreLedger) -> Result<&'a Destination, BranchError> {
    match &scene.body {
        SceneBody::ScoreCheck {
            conditions,
            default,
        } => conditions
            .iter()
            .find(|condition| ledger.satisfies(&condition.requires))
            .map(|condition| &condition.destination)
            .or(default.as_ref())
            .ok_or_else(|| BranchError::NoMatchingCondition(scene.id.clone())),
        SceneBody::Checkpoint {
            requires,
            pass,
            fail,
        } => Ok(if ledger.satisfies(requires) { pass } else { fail }),
        SceneBody::Dialogue { .. } | SceneBody::Ending { .. } => Err(BranchError::NotABranch {
            scene: scene.id.clone(),
            kind: scene.kind().name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::document::StoryDocument;
    use crate::schema::scene::StatMap;

    fn ledger(entries: &[(&str, i64)]) -> ScoreLedger {
        let initial: StatMap = entries.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        ScoreLedger::from_initial(&initial)
    }

    fn document() -> StoryDocument {
        StoryDocument::parse_json(
            r#"{
                "gate": {
                    "type": "score_check",
                    "conditions": [
                        {"requires": {"charisma": 5}, "next_scene": "A"},
                        {"requires": {"charisma": 2}, "next_scene": "B"}
                    ],
                    "default": {"next_scene": "C"}
                },
                "strict_gate": {
                    "type": "score_check",
                    "conditions": [{"requires": {"charisma": 9}, "next_scene": "A"}]
                },
                "door": {
                    "type": "checkpoint",
                    "requires": {"trust": 3},
                    "pass": {"next_scene": "P"},
                    "fail": {"next_scene": "F"}
                },
                "A": {"type": "ending"},
                "B": {"type": "ending"},
                "C": {"type": "ending"},
                "P": {"type": "ending"},
                "F": {"type": "ending"},
                "talk": {"text": "hi", "next_scene": "A"}
            }"#,
        )
        .unwrap()
    }

    fn scene_dest(id: &str) -> Destination {
        Destination::Scene(id.to_string())
    }

    #[test]
    fn score_check_first_match_wins() {
        let doc = document();
        let gate = doc.get("gate").unwrap();
        assert_eq!(evaluate(gate, &ledger(&[("charisma", 5)])), Ok(&scene_dest("A")));
        assert_eq!(evaluate(gate, &ledger(&[("charisma", 3)])), Ok(&scene_dest("B")));
        assert_eq!(evaluate(gate, &ledger(&[("charisma", 0)])), Ok(&scene_dest("C")));
        assert_eq!(evaluate(gate, &ledger(&[])), Ok(&scene_dest("C")));
    }

    #[test]
    fn score_check_without_default_is_content_error() {
        let doc = document();
        let gate = doc.get("strict_gate").unwrap();
        assert_eq!(
            evaluate(gate, &ledger(&[("charisma", 1)])),
            Err(BranchError::NoMatchingCondition("strict_gate".to_string()))
        );
    }

    #[test]
    fn checkpoint_pass_and_fail() {
        let doc = document();
        let door = doc.get("door").unwrap();
        assert_eq!(evaluate(door, &ledger(&[("trust", 3)])), Ok(&scene_dest("P")));
        assert_eq!(evaluate(door, &ledger(&[("trust", 2)])), Ok(&scene_dest("F")));
    }

    #[test]
    fn evaluation_does_not_touch_ledger() {
        let doc = document();
        let scores = ledger(&[("charisma", 4)]);
        let before = scores.snapshot();
        evaluate(doc.get("gate").unwrap(), &scores).unwrap();
        assert_eq!(scores.snapshot(), before);
    }

    #[test]
    fn dialogue_is_not_a_branch() {
        let doc = document();
        let talk = doc.get("talk").unwrap();
        assert!(!talk.kind().is_branch());
        assert!(matches!(
            evaluate(talk, &ledger(&[])),
            Err(BranchError::NotABranch { kind: "dialogue", .. })
        ));
    }
}
