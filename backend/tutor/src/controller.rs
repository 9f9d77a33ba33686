//! Socratic dialogue controller.
//!
//! One pass per student message: judge the reply, pick the mode, compose the
//! prompt, call the backend under a timeout, validate, append. Backend
//! trouble never escapes a turn; it degrades to a canned reply.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use vani_core::{
    Badge, Language, LlmProvider, LlmRequest, Mode, Speaker, Subject, Translator, TutorError,
    TutorSettings,
};
use vani_logging::{EventLogger, TutorEvent};

use crate::comprehension::{ComprehensionEstimator, Judgement, parse_backend_score};
use crate::session_state::Session;
use crate::system_prompt::{PromptComposer, evaluation_request, intro_message};
use crate::validator::{Repair, ResponseValidator};

/// Everything the presentation layer needs after one controller pass.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub reply: String,
    pub repairs: Vec<Repair>,
    /// Mode the reply was generated in.
    pub mode: Mode,
    pub comprehension_score: u8,
    pub subject: Subject,
    pub mastered: bool,
    /// The judged-turn limit has been reached. The session still accepts turns.
    pub dialogue_complete: bool,
    pub badge: Badge,
    /// `None` for the opening reply.
    pub judgement: Option<Judgement>,
}

pub struct TutorController {
    backend: Arc<dyn LlmProvider>,
    settings: TutorSettings,
    estimator: ComprehensionEstimator,
    composer: PromptComposer,
    validator: ResponseValidator,
}

impl TutorController {
    pub fn new(
        backend: Arc<dyn LlmProvider>,
        translator: Arc<dyn Translator>,
        settings: TutorSettings,
    ) -> Self {
        Self {
            estimator: ComprehensionEstimator::new(settings.scoring),
            composer: PromptComposer::new(settings.history_window),
            validator: ResponseValidator::new(translator),
            backend,
            settings,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn settings(&self) -> &TutorSettings {
        &self.settings
    }

    /// Opens a session for extracted problem text and produces the opener.
    ///
    /// The problem itself becomes the first student turn.
    #[instrument(skip_all, fields(backend = %self.backend.name(), language = %language))]
    pub async fn start_session(
        &self,
        problem_text: &str,
        language: Language,
    ) -> Result<(Session, TurnOutcome), TutorError> {
        let mut session = Session::new(
            problem_text,
            language,
            self.settings.scoring.initial_score,
            self.settings.policy,
        )?;
        let session_id = session.id().to_string();
        self.backend.begin_session();
        info!(session_id = %session_id, subject = %session.subject(), "session started");
        EventLogger::log_event(
            &session_id,
            TutorEvent::SessionStarted {
                subject: session.subject().display_name().to_string(),
                language: language.code().to_string(),
            },
        );

        let intro = intro_message(session.problem_text(), language);
        session.append(Speaker::Student, intro);
        let outcome = self.respond(&mut session, None).await?;
        Ok((session, outcome))
    }

    /// Judges a student message and produces the next tutor reply.
    ///
    /// An empty message is a turn like any other and is judged incorrect.
    #[instrument(skip_all, fields(session_id = %session.id()))]
    pub async fn submit_turn(
        &self,
        session: &mut Session,
        text: &str,
    ) -> Result<TurnOutcome, TutorError> {
        let text = text.trim();
        let (heuristic_score, correct) = self.estimator.update(session, text);
        let backend_score = if self.settings.scoring.assisted {
            self.assisted_score(session, text).await
        } else {
            None
        };
        let score = match backend_score {
            Some(b) => self.estimator.blend_into(session, b),
            None => heuristic_score,
        };

        EventLogger::log_event(
            &session.id().to_string(),
            TutorEvent::StudentTurn {
                content: text.to_string(),
                correct: Some(correct),
                score,
            },
        );

        let judgement = Judgement {
            correct,
            heuristic_score,
            backend_score,
            score,
        };
        session.append_judged(text, judgement);
        self.respond(session, Some(judgement)).await
    }

    async fn respond(
        &self,
        session: &mut Session,
        judgement: Option<Judgement>,
    ) -> Result<TurnOutcome, TutorError> {
        let payload = self.composer.compose(session)?;
        let mode = session.mode();
        let session_id = session.id().to_string();

        let request = payload.into_request(&self.settings.generation);
        let raw = self.generate(&request).await;
        if let Err(e) = &raw {
            EventLogger::log_event(
                &session_id,
                TutorEvent::BackendFailure {
                    provider: self.backend.name().to_string(),
                    error_msg: e.to_string(),
                },
            );
        }

        let validated = self.validator.validate(raw, session).await;
        for repair in &validated.repairs {
            EventLogger::log_event(
                &session_id,
                TutorEvent::Repair {
                    kind: repair.label().to_string(),
                },
            );
        }

        session.append(Speaker::Tutor, validated.text.clone());
        EventLogger::log_event(
            &session_id,
            TutorEvent::TutorReply {
                mode: mode.label().to_string(),
                content: validated.text.clone(),
            },
        );

        let dialogue_complete = session.attempts() >= self.settings.max_turns;
        if dialogue_complete {
            debug!(attempts = session.attempts(), "turn limit reached");
        }

        Ok(TurnOutcome {
            reply: validated.text,
            repairs: validated.repairs,
            mode,
            comprehension_score: session.comprehension_score(),
            subject: session.subject(),
            mastered: session.is_mastered(),
            dialogue_complete,
            badge: session.badge(),
            judgement,
        })
    }

    /// One bounded backend call. Timeouts and failures become `TutorError`s.
    async fn generate(&self, request: &LlmRequest) -> Result<String, TutorError> {
        let limit = self.settings.generation.timeout;
        match tokio::time::timeout(limit, self.backend.complete(request)).await {
            Ok(Ok(response)) => {
                debug!(
                    provider = %response.provider,
                    latency_ms = response.latency_ms,
                    tokens = response.tokens_used,
                    "backend replied"
                );
                Ok(response.content)
            }
            Ok(Err(e)) => Err(TutorError::BackendUnavailable {
                provider: self.backend.name().to_string(),
                message: format!("{e:#}"),
            }),
            Err(_) => Err(TutorError::BackendTimeout {
                after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    /// Second opinion from the backend. `None` keeps the heuristic score.
    async fn assisted_score(&self, session: &Session, reply: &str) -> Option<u8> {
        let concept = format!(
            "{} problem: {}",
            session.subject().display_name(),
            session.problem_text()
        );
        let request = evaluation_request(reply, &concept, &self.settings.generation);
        match self.generate(&request).await {
            Ok(raw) => {
                let score = parse_backend_score(&raw);
                if score.is_none() {
                    warn!("unusable backend evaluation, keeping heuristic score");
                }
                score
            }
            Err(e) => {
                warn!(error = %e, "assisted scoring unavailable, keeping heuristic score");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use anyhow::Result;
    use async_trait::async_trait;
    use vani_core::{LlmResponse, ModePolicy};
    use vani_providers::{DemoProvider, PassthroughTranslator};

    use crate::validator::canned_reply;

    const PROBLEM: &str = "F = ?, m = 5 kg, a = 2 m/s²";

    struct SlowProvider;

    #[async_trait]
    impl LlmProvider for SlowProvider {
        fn name(&self) -> &str {
            "slow"
        }

        async fn complete(&self, _req: &LlmRequest) -> Result<LlmResponse> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            anyhow::bail!("unreachable")
        }
    }

    /// Answers evaluation prompts with a fixed JSON verdict, everything else
    /// with a question.
    struct GradingProvider {
        verdict: &'static str,
    }

    #[async_trait]
    impl LlmProvider for GradingProvider {
        fn name(&self) -> &str {
            "grading"
        }

        async fn complete(&self, req: &LlmRequest) -> Result<LlmResponse> {
            let content = if req.system_prompt.contains("evaluator") {
                self.verdict.to_string()
            } else {
                "Good. What unit does force have?".to_string()
            };
            Ok(LlmResponse {
                content,
                provider: "grading".into(),
                model: "test".into(),
                tokens_used: 0,
                latency_ms: 0,
            })
        }
    }

    fn settings(initial_score: u8) -> TutorSettings {
        let mut settings = TutorSettings::default();
        settings.scoring.initial_score = initial_score;
        settings
    }

    fn controller(backend: Arc<dyn LlmProvider>, settings: TutorSettings) -> TutorController {
        TutorController::new(backend, Arc::new(PassthroughTranslator), settings)
    }

    fn demo(settings: TutorSettings) -> TutorController {
        controller(Arc::new(DemoProvider::new()), settings)
    }

    #[tokio::test]
    async fn opener_for_a_physics_problem() {
        let tutor = demo(settings(50));
        let (session, outcome) = tutor.start_session(PROBLEM, Language::En).await.unwrap();

        assert_eq!(outcome.subject, Subject::Physics);
        assert_eq!(outcome.mode, Mode::Socratic);
        assert_eq!(outcome.comprehension_score, 50);
        assert!(outcome.judgement.is_none());
        assert_eq!(outcome.reply.matches('?').count(), 1);

        let turns = session.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].speaker(), Speaker::Student);
        assert!(turns[0].text().contains(PROBLEM));
        assert_eq!(turns[1].text(), outcome.reply);
    }

    #[tokio::test]
    async fn every_session_gets_the_same_demo_opener() {
        let tutor = demo(settings(50));
        let (mut first, opener) = tutor.start_session(PROBLEM, Language::En).await.unwrap();
        tutor.submit_turn(&mut first, "mass is 5").await.unwrap();
        tutor.submit_turn(&mut first, "acceleration is 2").await.unwrap();

        let (_, again) = tutor.start_session(PROBLEM, Language::En).await.unwrap();
        assert_eq!(again.reply, opener.reply);
    }

    #[tokio::test]
    async fn student_turns_carry_their_judgement() {
        let tutor = demo(settings(50));
        let (mut session, _) = tutor.start_session(PROBLEM, Language::En).await.unwrap();
        let wrong = tutor.submit_turn(&mut session, "idk").await.unwrap();
        let right = tutor.submit_turn(&mut session, "force is 10 newton").await.unwrap();

        let turns = session.turns();
        assert_eq!(turns.len(), 6);
        assert!(turns[0].judgement().is_none());
        assert_eq!(turns[2].text(), "idk");
        assert_eq!(turns[2].judgement().copied(), wrong.judgement);
        assert_eq!(turns[4].judgement().map(|j| j.score), Some(55));
        assert_eq!(turns[4].judgement().copied(), right.judgement);
        assert!(turns[3].judgement().is_none());
    }

    #[tokio::test]
    async fn blank_problem_is_rejected() {
        let err = demo(settings(50)).start_session("  ", Language::En).await.unwrap_err();
        assert!(matches!(err, TutorError::NoProblemDetected));
    }

    #[tokio::test]
    async fn two_wrong_answers_reach_hint() {
        let tutor = demo(settings(50));
        let (mut session, _) = tutor.start_session(PROBLEM, Language::En).await.unwrap();

        let first = tutor.submit_turn(&mut session, "I don't know").await.unwrap();
        assert_eq!(first.comprehension_score, 40);
        assert_eq!(first.mode, Mode::Socratic);
        assert_eq!(session.consecutive_wrong(), 1);

        let second = tutor.submit_turn(&mut session, "no idea").await.unwrap();
        assert_eq!(second.comprehension_score, 30);
        assert_eq!(second.mode, Mode::Hint);
        assert_eq!(session.consecutive_wrong(), 2);
        assert_eq!(second.badge, Badge::Beginner);
    }

    #[tokio::test]
    async fn timeout_falls_back_to_scaffolded_question() {
        let mut s = settings(30);
        s.generation.timeout = Duration::from_millis(20);
        let tutor = controller(Arc::new(SlowProvider), s);

        let (session, outcome) = tutor.start_session(PROBLEM, Language::En).await.unwrap();
        assert_eq!(outcome.mode, Mode::Scaffolded);
        assert_eq!(outcome.reply, canned_reply(Mode::Scaffolded));
        assert_eq!(outcome.repairs, vec![Repair::BackendFailure]);
        assert_eq!(outcome.comprehension_score, 30);
        assert_eq!(session.turns().len(), 2);
        assert_eq!(session.turns()[1].text(), canned_reply(Mode::Scaffolded));
    }

    #[tokio::test]
    async fn backend_failure_does_not_touch_the_score() {
        let mut s = settings(50);
        s.generation.timeout = Duration::from_millis(20);
        let tutor = controller(Arc::new(SlowProvider), s);
        let (mut session, _) = tutor.start_session(PROBLEM, Language::En).await.unwrap();

        let outcome = tutor.submit_turn(&mut session, "the force is 10 newton").await.unwrap();
        assert_eq!(outcome.comprehension_score, 65);
        assert_eq!(outcome.reply, canned_reply(Mode::Socratic));
        assert_eq!(session.turns().len(), 4);
    }

    #[tokio::test]
    async fn high_score_without_mistakes_is_mastered() {
        let tutor = demo(settings(77));
        let (mut session, _) = tutor.start_session(PROBLEM, Language::En).await.unwrap();

        let outcome = tutor
            .submit_turn(&mut session, "F equals 10 because force = mass times acceleration")
            .await
            .unwrap();
        assert_eq!(outcome.comprehension_score, 92);
        assert!(outcome.mastered);
        assert_eq!(outcome.mode, Mode::DeepProbe);
        assert_eq!(outcome.badge, Badge::Expert);
        assert_eq!(outcome.judgement.map(|j| j.correct), Some(true));
    }

    #[tokio::test]
    async fn empty_turn_is_judged_wrong() {
        let tutor = demo(settings(50));
        let (mut session, _) = tutor.start_session(PROBLEM, Language::En).await.unwrap();
        let outcome = tutor.submit_turn(&mut session, "   ").await.unwrap();
        assert_eq!(outcome.judgement.map(|j| j.correct), Some(false));
        assert_eq!(outcome.comprehension_score, 40);
        assert!(!outcome.reply.is_empty());
    }

    #[tokio::test]
    async fn assisted_scoring_blends_backend_opinion() {
        let mut s = settings(50);
        s.scoring.assisted = true;
        let tutor = controller(
            Arc::new(GradingProvider { verdict: r#"{"score": 85, "feedback": "good"}"# }),
            s,
        );
        let (mut session, _) = tutor.start_session(PROBLEM, Language::En).await.unwrap();

        let outcome = tutor.submit_turn(&mut session, "force is 10 newton").await.unwrap();
        let judgement = outcome.judgement.unwrap();
        assert!(judgement.correct);
        assert_eq!(judgement.heuristic_score, 65);
        assert_eq!(judgement.backend_score, Some(85));
        assert_eq!(outcome.comprehension_score, 75);
        assert_eq!(outcome.mode, Mode::DeepProbe);
    }

    #[tokio::test]
    async fn malformed_evaluation_keeps_heuristic_score() {
        let mut s = settings(50);
        s.scoring.assisted = true;
        let tutor = controller(Arc::new(GradingProvider { verdict: "I think 85" }), s);
        let (mut session, _) = tutor.start_session(PROBLEM, Language::En).await.unwrap();

        let outcome = tutor.submit_turn(&mut session, "force is 10 newton").await.unwrap();
        assert_eq!(outcome.judgement.unwrap().backend_score, None);
        assert_eq!(outcome.comprehension_score, 65);
    }

    #[tokio::test]
    async fn dialogue_completes_after_turn_limit() {
        let mut s = settings(50);
        s.max_turns = 2;
        let tutor = demo(s);
        let (mut session, opener) = tutor.start_session(PROBLEM, Language::En).await.unwrap();
        assert!(!opener.dialogue_complete);

        let first = tutor.submit_turn(&mut session, "mass is 5").await.unwrap();
        assert!(!first.dialogue_complete);
        let second = tutor.submit_turn(&mut session, "acceleration is 2").await.unwrap();
        assert!(second.dialogue_complete);
        let third = tutor.submit_turn(&mut session, "so 10").await.unwrap();
        assert!(third.dialogue_complete);
        assert_eq!(session.attempts(), 3);
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let tutor = demo(settings(50));
        let (mut a, _) = tutor.start_session(PROBLEM, Language::En).await.unwrap();
        let (b, _) = tutor.start_session("Explain photosynthesis", Language::Ta).await.unwrap();

        tutor.submit_turn(&mut a, "idk").await.unwrap();
        assert_eq!(a.comprehension_score(), 40);
        assert_eq!(b.comprehension_score(), 50);
        assert_eq!(b.subject(), Subject::Biology);
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn policy_from_settings_reaches_the_session() {
        let mut s = settings(50);
        s.policy = ModePolicy::new(3, 80, 45, 95);
        let tutor = demo(s);
        let (mut session, _) = tutor.start_session(PROBLEM, Language::En).await.unwrap();
        tutor.submit_turn(&mut session, "idk").await.unwrap();
        let outcome = tutor.submit_turn(&mut session, "idk").await.unwrap();
        assert_eq!(outcome.mode, Mode::Scaffolded);
        let outcome = tutor.submit_turn(&mut session, "idk").await.unwrap();
        assert_eq!(outcome.mode, Mode::Hint);
    }
}
