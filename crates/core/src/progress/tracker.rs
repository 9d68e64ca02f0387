use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::model::{OptionId, QuestionId, Section, SectionId};
use crate::progress::persisted::{
    PersistedProgress, PersistedQuestionProgress, PersistedSectionProgress,
};
use crate::progress::state::{ModuleProgress, QuestionProgress, SectionProgress};
use crate::progress::summary::{
    CompletionBlocker, CompletionCount, CompletionGate, ProgressSummary, SectionDetail,
    percentage,
};

/// Progress state machine for one module-viewing session.
///
/// Per section: `Unseen -> Seen -> Completed`. A non-question section completes
/// the moment it is seen; a question section completes once it is both seen and
/// answered, in either order. Nothing ever moves backwards, so duplicate or
/// out-of-order events from the UI are harmless.
///
/// Every operation is a pure function from one `ModuleProgress` to the next.
pub struct ProgressTracker;

impl ProgressTracker {
    /// Build the initial progress for `sections`, seeded from an optional prior snapshot.
    ///
    /// Prior entries that are already seen/answered are carried over; entries for
    /// sections or questions that are no longer part of the module are dropped.
    #[must_use]
    pub fn initialize(sections: &[Section], prior: Option<&PersistedProgress>) -> ModuleProgress {
        let mut prior_sections: HashMap<SectionId, &PersistedSectionProgress> = HashMap::new();
        let mut prior_questions: HashMap<QuestionId, &PersistedQuestionProgress> = HashMap::new();
        if let Some(prior) = prior {
            for entry in prior.sections.iter().filter(|s| s.has_seen) {
                prior_sections.entry(entry.section_id).or_insert(entry);
            }
            for entry in prior.questions.iter().filter(|q| q.has_answered) {
                prior_questions.entry(entry.question_id).or_insert(entry);
            }
        }

        let mut prior_completed: HashMap<SectionId, DateTime<Utc>> = HashMap::new();
        let mut progress = ModuleProgress::default();
        for section in sections {
            let question_id = section.question_id();

            if let Some(qid) = question_id {
                let question = match prior_questions.get(&qid) {
                    Some(p) => {
                        QuestionProgress::answered(qid, p.option_id, p.is_correct, p.answered_at)
                    }
                    None => QuestionProgress::unanswered(qid),
                };
                progress.questions.insert(qid, question);
            }

            let mut entry = SectionProgress::unseen(section.id, question_id);
            if let Some(p) = prior_sections.get(&section.id) {
                entry.mark_seen(p.seen_at);
                if let Some(at) = p.completed_at {
                    prior_completed.insert(section.id, at);
                }
            }
            progress.sections.insert(section.id, entry);
        }

        settle_seeded_completion(&mut progress, &prior_completed);
        progress
    }

    /// Mark a section as seen. Repeats keep the first `seen_at`.
    #[must_use]
    pub fn record_section_seen(
        progress: &ModuleProgress,
        section_id: SectionId,
        at: DateTime<Utc>,
    ) -> ModuleProgress {
        let mut next = progress.clone();

        let Some(current) = next.sections.get(&section_id) else {
            return next;
        };
        if current.has_seen() {
            return next;
        }
        let completes = match current.question_id() {
            None => true,
            Some(qid) => next.is_answered(qid),
        };

        if let Some(entry) = next.sections.get_mut(&section_id) {
            entry.mark_seen(Some(at));
            if completes {
                entry.mark_completed(Some(at));
            }
        }
        next
    }

    /// Record the answer to a question. Only the first answer counts.
    #[must_use]
    pub fn record_answer(
        progress: &ModuleProgress,
        question_id: QuestionId,
        selected_option: OptionId,
        is_correct: bool,
        at: DateTime<Utc>,
    ) -> ModuleProgress {
        let mut next = progress.clone();

        match next.questions.get_mut(&question_id) {
            Some(question) if !question.has_answered() => {
                *question =
                    QuestionProgress::answered(question_id, Some(selected_option), is_correct, Some(at));
            }
            _ => return next,
        }

        if let Some(section) = next
            .sections
            .values_mut()
            .find(|s| s.question_id() == Some(question_id))
        {
            if section.has_seen() {
                section.mark_completed(Some(at));
            }
        }
        next
    }

    /// Derive completion figures for `sections` without touching `progress`.
    #[must_use]
    pub fn compute_summary(progress: &ModuleProgress, sections: &[Section]) -> ProgressSummary {
        let details: Vec<SectionDetail> = sections
            .iter()
            .map(|section| section_detail(progress, section))
            .collect();

        let completed = details.iter().filter(|d| d.completed).count();
        let question_total = details.iter().filter(|d| d.requires_answer).count();
        let question_answered = details
            .iter()
            .filter(|d| d.requires_answer && d.answered)
            .count();

        ProgressSummary {
            percentage: percentage(completed, details.len()),
            sections: CompletionCount::new(completed, details.len()),
            questions: CompletionCount::new(question_answered, question_total),
            details,
        }
    }

    /// Gate for the "complete module" action.
    ///
    /// A seen-but-unanswered question is reported ahead of unseen sections.
    #[must_use]
    pub fn can_complete(progress: &ModuleProgress, sections: &[Section]) -> CompletionGate {
        let mut any_unseen = false;
        for section in sections {
            let detail = section_detail(progress, section);
            if !detail.seen {
                any_unseen = true;
            } else if detail.requires_answer && !detail.answered {
                return CompletionGate::Blocked(CompletionBlocker::UnansweredQuestions);
            }
        }

        if any_unseen {
            CompletionGate::Blocked(CompletionBlocker::UnseenSections)
        } else {
            CompletionGate::Allowed
        }
    }
}

fn section_detail(progress: &ModuleProgress, section: &Section) -> SectionDetail {
    let seen = progress.is_seen(section.id);
    let requires_answer = section.requires_answer();
    let answered = section
        .question_id()
        .is_some_and(|qid| progress.is_answered(qid));

    SectionDetail {
        section_id: section.id,
        kind: section.kind(),
        requires_answer,
        seen,
        answered,
        completed: seen && (!requires_answer || answered),
    }
}

// Completion is re-derived from the seeded seen/answered flags. A snapshot's
// stamp is kept only for sections that still qualify as complete.
fn settle_seeded_completion(
    progress: &mut ModuleProgress,
    prior_completed: &HashMap<SectionId, DateTime<Utc>>,
) {
    let answered_at: HashMap<QuestionId, Option<DateTime<Utc>>> = progress
        .questions
        .values()
        .filter(|q| q.has_answered())
        .map(|q| (q.question_id(), q.answered_at()))
        .collect();

    for section in progress.sections.values_mut() {
        if !section.has_seen() {
            continue;
        }
        let derived = match section.question_id() {
            None => Some(section.seen_at()),
            Some(qid) => answered_at.get(&qid).map(|answered| {
                match (section.seen_at(), *answered) {
                    (Some(seen), Some(answered)) => Some(seen.max(answered)),
                    (seen, answered) => seen.or(answered),
                }
            }),
        };
        if let Some(stamp) = derived {
            let prior = prior_completed.get(&section.section_id()).copied();
            section.mark_completed(prior.or(stamp));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerOption, Question, SectionContent};
    use crate::time::{fixed_after, fixed_now};

    fn text(id: u64) -> Section {
        Section::text(SectionId::new(id), u32::try_from(id).unwrap(), "body")
    }

    fn video(id: u64) -> Section {
        Section::video(SectionId::new(id), u32::try_from(id).unwrap(), "https://cdn/v.mp4")
    }

    fn question(id: u64, qid: u64) -> Section {
        Section::question(
            SectionId::new(id),
            u32::try_from(id).unwrap(),
            Question::new(
                QuestionId::new(qid),
                "Which structure gives O(1) lookups?",
                vec![
                    AnswerOption::new(OptionId::new(1), "linked list", false),
                    AnswerOption::new(OptionId::new(2), "hash map", true),
                ],
            ),
        )
    }

    fn seen(progress: &ModuleProgress, id: u64, offset: i64) -> ModuleProgress {
        ProgressTracker::record_section_seen(progress, SectionId::new(id), fixed_after(offset))
    }

    #[test]
    fn fresh_progress_is_unseen_and_unanswered() {
        let sections = vec![text(1), question(2, 10)];
        let progress = ProgressTracker::initialize(&sections, None);

        assert_eq!(progress.sections().count(), 2);
        assert_eq!(progress.questions().count(), 1);
        assert!(!progress.is_seen(SectionId::new(1)));
        assert!(!progress.is_answered(QuestionId::new(10)));
        assert_eq!(
            progress.section(SectionId::new(2)).unwrap().question_id(),
            Some(QuestionId::new(10))
        );
    }

    #[test]
    fn seen_is_monotonic_and_keeps_first_timestamp() {
        let sections = vec![text(1)];
        let p0 = ProgressTracker::initialize(&sections, None);
        let once = seen(&p0, 1, 0);
        let mut many = once.clone();
        for offset in 1..5 {
            many = seen(&many, 1, offset);
        }

        assert_eq!(once, many);
        let entry = many.section(SectionId::new(1)).unwrap();
        assert!(entry.has_seen());
        assert_eq!(entry.seen_at(), Some(fixed_now()));
    }

    #[test]
    fn operations_do_not_mutate_their_input() {
        let sections = vec![text(1)];
        let p0 = ProgressTracker::initialize(&sections, None);
        let _p1 = seen(&p0, 1, 0);
        assert!(!p0.is_seen(SectionId::new(1)));
    }

    #[test]
    fn non_question_section_completes_when_seen() {
        let sections = vec![text(1), video(2)];
        let p = seen(&ProgressTracker::initialize(&sections, None), 2, 3);
        let entry = p.section(SectionId::new(2)).unwrap();
        assert_eq!(entry.completed_at(), Some(fixed_after(3)));
    }

    #[test]
    fn question_section_waits_for_answer() {
        let sections = vec![question(2, 10)];
        let p = seen(&ProgressTracker::initialize(&sections, None), 2, 1);
        assert!(p.section(SectionId::new(2)).unwrap().completed_at().is_none());

        let p = ProgressTracker::record_answer(
            &p,
            QuestionId::new(10),
            OptionId::new(2),
            true,
            fixed_after(5),
        );
        assert_eq!(
            p.section(SectionId::new(2)).unwrap().completed_at(),
            Some(fixed_after(5))
        );
    }

    #[test]
    fn answer_before_seen_completes_on_sighting() {
        let sections = vec![question(2, 10)];
        let p = ProgressTracker::initialize(&sections, None);
        let p = ProgressTracker::record_answer(
            &p,
            QuestionId::new(10),
            OptionId::new(1),
            false,
            fixed_after(1),
        );
        assert!(p.section(SectionId::new(2)).unwrap().completed_at().is_none());

        let p = seen(&p, 2, 4);
        assert_eq!(
            p.section(SectionId::new(2)).unwrap().completed_at(),
            Some(fixed_after(4))
        );
    }

    #[test]
    fn first_answer_is_final() {
        let sections = vec![question(2, 10)];
        let p = ProgressTracker::initialize(&sections, None);
        let first = ProgressTracker::record_answer(
            &p,
            QuestionId::new(10),
            OptionId::new(1),
            false,
            fixed_after(1),
        );
        let second = ProgressTracker::record_answer(
            &first,
            QuestionId::new(10),
            OptionId::new(2),
            true,
            fixed_after(2),
        );

        assert_eq!(first, second);
        let q = second.question(QuestionId::new(10)).unwrap();
        assert_eq!(q.selected_option(), Some(OptionId::new(1)));
        assert!(!q.is_correct());
        assert_eq!(q.answered_at(), Some(fixed_after(1)));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let sections = vec![text(1), question(2, 10)];
        let p = ProgressTracker::initialize(&sections, None);

        let after_seen = seen(&p, 99, 0);
        let after_answer = ProgressTracker::record_answer(
            &p,
            QuestionId::new(77),
            OptionId::new(1),
            true,
            fixed_now(),
        );
        assert_eq!(after_seen, p);
        assert_eq!(after_answer, p);
    }

    #[test]
    fn completion_truth_table() {
        let sections = vec![text(1), question(2, 10)];
        let base = ProgressTracker::initialize(&sections, None);
        let answer = |p: &ModuleProgress| {
            ProgressTracker::record_answer(p, QuestionId::new(10), OptionId::new(2), true, fixed_now())
        };

        let cases = [
            (false, false, false, false),
            (true, false, true, false),
            (false, true, false, false),
            (true, true, true, true),
        ];
        for (is_seen, is_answered, text_done, question_done) in cases {
            let mut p = base.clone();
            if is_seen {
                p = seen(&seen(&p, 1, 0), 2, 0);
            }
            if is_answered {
                p = answer(&p);
            }
            let summary = ProgressTracker::compute_summary(&p, &sections);
            assert_eq!(summary.details[0].completed, text_done, "{is_seen}/{is_answered}");
            assert_eq!(summary.details[1].completed, question_done, "{is_seen}/{is_answered}");
        }
    }

    #[test]
    fn summary_of_empty_module_is_zero() {
        let p = ProgressTracker::initialize(&[], None);
        let summary = ProgressTracker::compute_summary(&p, &[]);
        assert_eq!(summary.percentage, 0.0);
        assert_eq!(summary.sections.total, 0);
        assert_eq!(summary.questions.percentage, 0.0);
        assert!(summary.details.is_empty());
        assert!(ProgressTracker::can_complete(&p, &[]).is_allowed());
    }

    #[test]
    fn summary_percentage_stays_in_bounds() {
        let sections = vec![text(1), video(2), question(3, 10)];
        let mut p = ProgressTracker::initialize(&sections, None);
        let mut last = ProgressTracker::compute_summary(&p, &sections).percentage;
        assert_eq!(last, 0.0);
        for id in [2, 1, 3, 3, 1] {
            p = seen(&p, id, 0);
            let pct = ProgressTracker::compute_summary(&p, &sections).percentage;
            assert!((0.0..=100.0).contains(&pct));
            assert!(pct >= last);
            last = pct;
        }
        let summary = ProgressTracker::compute_summary(&p, &sections);
        assert_eq!(summary.sections.completed, 2);
        assert_eq!(summary.questions.completed, 0);
        assert_eq!(summary.questions.total, 1);
    }

    #[test]
    fn gate_prefers_unanswered_questions() {
        let sections = vec![text(1), question(2, 10), video(3)];
        let p = ProgressTracker::initialize(&sections, None);
        let p = seen(&seen(&p, 1, 0), 2, 1);

        let gate = ProgressTracker::can_complete(&p, &sections);
        assert_eq!(
            gate,
            CompletionGate::Blocked(CompletionBlocker::UnansweredQuestions)
        );
    }

    #[test]
    fn gate_reports_unseen_sections() {
        let sections = vec![text(1), question(2, 10), video(3)];
        let p = ProgressTracker::initialize(&sections, None);
        let p = seen(&p, 1, 0);
        let p = ProgressTracker::record_answer(&p, QuestionId::new(10), OptionId::new(2), true, fixed_now());

        // Answered but never scrolled into view still counts as unseen.
        assert_eq!(
            ProgressTracker::can_complete(&p, &sections).reason(),
            Some(CompletionBlocker::UnseenSections)
        );
    }

    #[test]
    fn end_to_end_module_completion() {
        let sections = vec![text(1), question(2, 10)];
        let p = ProgressTracker::initialize(&sections, None);
        let p = ProgressTracker::record_section_seen(&p, SectionId::new(1), fixed_after(0));
        let p = ProgressTracker::record_section_seen(&p, SectionId::new(2), fixed_after(1));
        let p = ProgressTracker::record_answer(
            &p,
            QuestionId::new(10),
            OptionId::new(2),
            true,
            fixed_after(2),
        );

        let summary = ProgressTracker::compute_summary(&p, &sections);
        assert_eq!(summary.percentage, 100.0);
        assert_eq!(summary.sections, CompletionCount::new(2, 2));
        assert_eq!(summary.questions, CompletionCount::new(1, 1));
        assert_eq!(
            ProgressTracker::can_complete(&p, &sections),
            CompletionGate::Allowed
        );
        assert_eq!(p.correct_answers(), 1);
    }

    #[test]
    fn resumed_session_keeps_prior_progress() {
        let sections = vec![text(1), question(2, 10)];
        let prior = PersistedProgress {
            sections: vec![PersistedSectionProgress {
                section_id: SectionId::new(1),
                has_seen: true,
                seen_at: Some(fixed_now()),
                completed_at: None,
            }],
            questions: Vec::new(),
        };

        let p = ProgressTracker::initialize(&sections, Some(&prior));
        assert!(p.is_seen(SectionId::new(1)));
        assert_eq!(
            p.section(SectionId::new(1)).unwrap().completed_at(),
            Some(fixed_now())
        );
        assert!(!p.is_seen(SectionId::new(2)));
    }

    #[test]
    fn seeding_drops_completion_for_unanswered_question() {
        let sections = vec![text(1), question(2, 11)];
        let prior = PersistedProgress {
            sections: vec![
                PersistedSectionProgress {
                    section_id: SectionId::new(1),
                    has_seen: true,
                    seen_at: Some(fixed_now()),
                    completed_at: Some(fixed_now()),
                },
                PersistedSectionProgress {
                    section_id: SectionId::new(2),
                    has_seen: true,
                    seen_at: Some(fixed_now()),
                    completed_at: Some(fixed_after(1)),
                },
            ],
            questions: Vec::new(),
        };

        let p = ProgressTracker::initialize(&sections, Some(&prior));
        let entry = p.section(SectionId::new(2)).unwrap();
        assert!(entry.has_seen());
        assert!(!p.is_answered(QuestionId::new(11)));
        assert_eq!(entry.completed_at(), None);
        assert_eq!(
            p.section(SectionId::new(1)).unwrap().completed_at(),
            Some(fixed_now())
        );

        let p = ProgressTracker::record_answer(
            &p,
            QuestionId::new(11),
            OptionId::new(2),
            true,
            fixed_after(50),
        );
        assert_eq!(
            p.section(SectionId::new(2)).unwrap().completed_at(),
            Some(fixed_after(50))
        );
        assert_eq!(
            ProgressTracker::can_complete(&p, &sections),
            CompletionGate::Allowed
        );
    }

    #[test]
    fn seeding_never_regresses_flags() {
        let sections = vec![question(2, 10)];
        let prior = PersistedProgress {
            sections: vec![
                PersistedSectionProgress {
                    section_id: SectionId::new(2),
                    has_seen: true,
                    seen_at: Some(fixed_after(1)),
                    completed_at: None,
                },
                PersistedSectionProgress {
                    section_id: SectionId::new(2),
                    has_seen: false,
                    seen_at: None,
                    completed_at: None,
                },
                PersistedSectionProgress {
                    section_id: SectionId::new(42),
                    has_seen: true,
                    seen_at: None,
                    completed_at: None,
                },
            ],
            questions: vec![PersistedQuestionProgress {
                question_id: QuestionId::new(10),
                has_answered: true,
                option_id: Some(OptionId::new(2)),
                is_correct: true,
                answered_at: Some(fixed_after(3)),
            }],
        };

        let p = ProgressTracker::initialize(&sections, Some(&prior));
        assert!(p.is_seen(SectionId::new(2)));
        assert!(p.is_answered(QuestionId::new(10)));
        assert!(p.section(SectionId::new(42)).is_none());
        assert_eq!(
            p.section(SectionId::new(2)).unwrap().completed_at(),
            Some(fixed_after(3))
        );

        let again = ProgressTracker::record_answer(
            &p,
            QuestionId::new(10),
            OptionId::new(1),
            false,
            fixed_after(9),
        );
        assert_eq!(again, p);
    }

    #[test]
    fn unknown_kind_uses_plain_semantics() {
        let sections = vec![Section::new(
            SectionId::new(1),
            1,
            SectionContent::Other {
                kind: "diagram".into(),
            },
        )];
        let p = seen(&ProgressTracker::initialize(&sections, None), 1, 0);
        let summary = ProgressTracker::compute_summary(&p, &sections);
        assert_eq!(summary.percentage, 100.0);
        assert!(!summary.details[0].requires_answer);
    }

    #[test]
    fn persisted_snapshot_round_trips_through_initialize() {
        let sections = vec![text(1), question(2, 10), video(3)];
        let p = ProgressTracker::initialize(&sections, None);
        let p = seen(&seen(&p, 1, 0), 2, 1);
        let p = ProgressTracker::record_answer(&p, QuestionId::new(10), OptionId::new(1), false, fixed_after(2));

        let resumed = ProgressTracker::initialize(&sections, Some(&p.to_persisted()));
        assert_eq!(resumed, p);
    }
}
