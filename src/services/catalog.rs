use rand::seq::SliceRandom;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::core::state::AppState;
use crate::core::time::now_utc;
use crate::db::models::{Question, Quiz, QuizMetadata, QuizSettings};
use crate::db::types::{AnswerShape, QuestionType};
use crate::repositories::{quizzes, submissions};
use crate::schemas::quiz::{QuestionCreate, QuizCreate, QuizUpdate, StudentQuizView};
use crate::services::EngineError;

pub(crate) async fn create_quiz(state: &AppState, payload: QuizCreate) -> Result<Quiz, EngineError> {
    let settings = payload.settings.unwrap_or_default();
    validate_settings(&settings)?;

    let now = now_utc();
    let mut questions = Vec::with_capacity(payload.questions.len());
    for (index, input) in payload.questions.into_iter().enumerate() {
        questions.push(build_question(input, index as i32)?);
    }

    let mut quiz = Quiz {
        id: Uuid::new_v4().to_string(),
        course_id: payload.course_id,
        instructor_id: payload.instructor_id,
        title: payload.title,
        description: payload.description,
        instructions: payload.instructions,
        questions,
        settings,
        metadata: QuizMetadata::draft(now),
        categories: payload.categories,
        tags: payload.tags,
        assigned_students: payload.assigned_students,
    };
    quiz.recompute_metadata(now);

    let (mut all, version) = quizzes::load(state.store()).await?;
    all.push(quiz.clone());
    quizzes::save(state.store(), &all, version).await?;

    tracing::info!(quiz_id = %quiz.id, course_id = %quiz.course_id, "Quiz created");
    Ok(quiz)
}

pub(crate) async fn update_quiz(
    state: &AppState,
    quiz_id: &str,
    update: QuizUpdate,
) -> Result<Quiz, EngineError> {
    mutate_quiz(state, quiz_id, update.expected_version, |quiz, now| {
        if let Some(title) = update.title {
            quiz.title = title;
        }
        if let Some(description) = update.description {
            quiz.description = description;
        }
        if let Some(instructions) = update.instructions {
            quiz.instructions = instructions;
        }
        if let Some(settings) = update.settings {
            validate_settings(&settings)?;
            quiz.settings = settings;
        }
        if let Some(categories) = update.categories {
            quiz.categories = categories;
        }
        if let Some(tags) = update.tags {
            quiz.tags = tags;
        }
        if let Some(assigned_students) = update.assigned_students {
            quiz.assigned_students = assigned_students;
        }

        quiz.recompute_metadata(now);

        // Metadata is derived; explicit values are tolerated only when they
        // agree with what was just recomputed.
        if let Some(metadata) = update.metadata {
            let total_conflicts = metadata
                .total_points
                .is_some_and(|points| points != quiz.metadata.total_points);
            let count_conflicts = metadata
                .question_count
                .is_some_and(|count| count != quiz.metadata.question_count);
            if total_conflicts || count_conflicts {
                return Err(EngineError::StaleMetadata);
            }
        }

        Ok(())
    })
    .await
}

pub(crate) async fn add_question(
    state: &AppState,
    quiz_id: &str,
    input: QuestionCreate,
) -> Result<Quiz, EngineError> {
    let question = build_question(input, 0)?;
    mutate_quiz(state, quiz_id, None, move |quiz, now| {
        let mut question = question;
        question.order = quiz.questions.len() as i32;
        quiz.questions.push(question);
        quiz.recompute_metadata(now);
        Ok(())
    })
    .await
}

pub(crate) async fn remove_question(
    state: &AppState,
    quiz_id: &str,
    question_id: &str,
) -> Result<Quiz, EngineError> {
    let question_id = question_id.to_string();
    mutate_quiz(state, quiz_id, None, move |quiz, now| {
        let before = quiz.questions.len();
        quiz.questions.retain(|question| question.id != question_id);
        if quiz.questions.len() == before {
            return Err(EngineError::UnknownQuestion(question_id.clone()));
        }
        reindex(&mut quiz.questions);
        quiz.recompute_metadata(now);
        Ok(())
    })
    .await
}

pub(crate) async fn reorder_questions(
    state: &AppState,
    quiz_id: &str,
    ordered_ids: Vec<String>,
) -> Result<Quiz, EngineError> {
    mutate_quiz(state, quiz_id, None, move |quiz, now| {
        if ordered_ids.len() != quiz.questions.len() {
            return Err(EngineError::Validation(
                "question_ids must be a permutation of the quiz's questions".to_string(),
            ));
        }

        let mut reordered = Vec::with_capacity(ordered_ids.len());
        for id in &ordered_ids {
            let position = quiz
                .questions
                .iter()
                .position(|question| &question.id == id)
                .ok_or_else(|| EngineError::UnknownQuestion(id.clone()))?;
            reordered.push(quiz.questions.remove(position));
        }

        quiz.questions = reordered;
        reindex(&mut quiz.questions);
        quiz.recompute_metadata(now);
        Ok(())
    })
    .await
}

pub(crate) async fn publish_quiz(state: &AppState, quiz_id: &str) -> Result<Quiz, EngineError> {
    mutate_quiz(state, quiz_id, None, |quiz, now| {
        if quiz.questions.is_empty() {
            return Err(EngineError::EmptyQuiz);
        }
        validate_settings(&quiz.settings)?;
        quiz.metadata.published = true;
        quiz.recompute_metadata(now);
        Ok(())
    })
    .await
}

/// Deleting a quiz that submissions still reference is rejected outright;
/// the gradebook depends on being able to resolve it.
pub(crate) async fn delete_quiz(state: &AppState, quiz_id: &str) -> Result<(), EngineError> {
    if submissions::any_for_quiz(state.store(), quiz_id).await? {
        return Err(EngineError::QuizHasSubmissions);
    }

    let (mut all, version) = quizzes::load(state.store()).await?;
    let before = all.len();
    all.retain(|quiz| quiz.id != quiz_id);
    if all.len() == before {
        return Err(EngineError::QuizNotFound(quiz_id.to_string()));
    }
    quizzes::save(state.store(), &all, version).await?;

    tracing::info!(quiz_id = %quiz_id, "Quiz deleted");
    Ok(())
}

pub(crate) async fn get_quiz(state: &AppState, quiz_id: &str) -> Result<Quiz, EngineError> {
    quizzes::find_by_id(state.store(), quiz_id)
        .await?
        .ok_or_else(|| EngineError::QuizNotFound(quiz_id.to_string()))
}

pub(crate) async fn list_by_course(
    state: &AppState,
    course_id: &str,
) -> Result<Vec<Quiz>, EngineError> {
    Ok(quizzes::list_by_course(state.store(), course_id).await?)
}

pub(crate) async fn list_by_instructor(
    state: &AppState,
    instructor_id: &str,
) -> Result<Vec<Quiz>, EngineError> {
    let quizzes = quizzes::list_by_instructor(state.store(), instructor_id).await?;
    Ok(quizzes.into_iter().filter(|quiz| quiz.metadata.published).collect())
}

pub(crate) async fn list_for_student(
    state: &AppState,
    course_id: &str,
    student_id: &str,
) -> Result<Vec<Quiz>, EngineError> {
    let quizzes = quizzes::list_by_course(state.store(), course_id).await?;
    Ok(quizzes.into_iter().filter(|quiz| quiz.visible_to(student_id)).collect())
}

/// Student rendition of a published quiz: answer keys stripped, question
/// pool and shuffle settings applied.
pub(crate) async fn student_view(
    state: &AppState,
    quiz_id: &str,
    student_id: &str,
) -> Result<StudentQuizView, EngineError> {
    let quiz = get_quiz(state, quiz_id).await?;
    if !quiz.visible_to(student_id) {
        return Err(EngineError::QuizNotFound(quiz_id.to_string()));
    }

    let mut ordered: Vec<&Question> = quiz.questions.iter().collect();
    ordered.sort_by_key(|question| question.order);

    let mut rng = rand::thread_rng();
    let mut selected = match quiz.settings.question_pool {
        Some(pool) if pool < ordered.len() => {
            let mut sampled: Vec<&Question> =
                ordered.choose_multiple(&mut rng, pool).copied().collect();
            sampled.sort_by_key(|question| question.order);
            sampled
        }
        _ => ordered,
    };

    if quiz.settings.shuffle_questions {
        selected.shuffle(&mut rng);
    }

    let mut view = StudentQuizView::render(&quiz, selected);
    if quiz.settings.shuffle_options {
        for question in &mut view.questions {
            question.options.shuffle(&mut rng);
        }
    }

    Ok(view)
}

async fn mutate_quiz<F>(
    state: &AppState,
    quiz_id: &str,
    expected_version: Option<i64>,
    apply: F,
) -> Result<Quiz, EngineError>
where
    F: FnOnce(&mut Quiz, OffsetDateTime) -> Result<(), EngineError>,
{
    let (mut all, collection_version) = quizzes::load(state.store()).await?;
    let quiz = all
        .iter_mut()
        .find(|quiz| quiz.id == quiz_id)
        .ok_or_else(|| EngineError::QuizNotFound(quiz_id.to_string()))?;

    if let Some(expected) = expected_version {
        if expected != quiz.metadata.version {
            return Err(EngineError::ConcurrentModification);
        }
    }

    apply(quiz, now_utc())?;
    let updated = quiz.clone();

    quizzes::save(state.store(), &all, collection_version).await?;
    Ok(updated)
}

/// Empty authoring payload for a question of the given type, ready for the
/// instructor to fill in. Unknown type names fail `InvalidQuestionType`.
pub(crate) fn question_template(raw_type: &str) -> Result<Question, EngineError> {
    let question_type = QuestionType::parse(raw_type)
        .ok_or_else(|| EngineError::InvalidQuestionType(raw_type.to_string()))?;

    Ok(Question {
        id: Uuid::new_v4().to_string(),
        question_type,
        text: String::new(),
        points: 1,
        required: true,
        order: 0,
        difficulty: None,
        category: None,
        tags: Vec::new(),
        media: Vec::new(),
        options: Vec::new(),
        correct_answer: question_type.blank_answer(),
    })
}

pub(crate) fn build_question(input: QuestionCreate, order: i32) -> Result<Question, EngineError> {
    let question_type = QuestionType::parse(&input.question_type)
        .ok_or_else(|| EngineError::InvalidQuestionType(input.question_type.clone()))?;

    if input.text.trim().is_empty() {
        return Err(EngineError::Validation("question text must not be empty".to_string()));
    }
    if input.points < 1 {
        return Err(EngineError::Validation("question points must be positive".to_string()));
    }
    if !question_type.uses_options() && !input.options.is_empty() {
        return Err(EngineError::Validation(format!(
            "question type '{}' does not take options",
            question_type.as_str()
        )));
    }

    let correct_answer = input.correct_answer;

    if let Some(answer) = &correct_answer {
        let shape_matches = match question_type.answer_shape() {
            AnswerShape::Scalar => answer.as_text().is_some(),
            AnswerShape::Ordered | AnswerShape::Unordered => answer.as_list().is_some(),
            AnswerShape::Manual => true, // advisory only, any shape is stored as-is
        };
        if !shape_matches {
            return Err(EngineError::Validation(format!(
                "correct_answer shape does not match question type '{}'",
                question_type.as_str()
            )));
        }
    }

    if question_type == QuestionType::MultipleChoice {
        let non_empty = input.options.iter().filter(|option| !option.trim().is_empty()).count();
        if non_empty < 2 {
            return Err(EngineError::Validation(
                "multiple-choice questions need at least 2 non-empty options".to_string(),
            ));
        }
        let key = correct_answer
            .as_ref()
            .and_then(|answer| answer.as_text())
            .ok_or_else(|| {
                EngineError::Validation(
                    "multiple-choice questions need a scalar correct_answer".to_string(),
                )
            })?;
        if !input.options.iter().any(|option| option == key) {
            return Err(EngineError::Validation(
                "correct_answer must equal one of the options".to_string(),
            ));
        }
    }

    if question_type == QuestionType::Matching {
        if let Some(list) = correct_answer.as_ref().and_then(|answer| answer.as_list()) {
            if list.len() != input.options.len() {
                return Err(EngineError::Validation(
                    "matching correct_answer must align index-wise with options".to_string(),
                ));
            }
        }
    }

    Ok(Question {
        id: Uuid::new_v4().to_string(),
        question_type,
        text: input.text,
        points: input.points,
        required: input.required,
        order,
        difficulty: input.difficulty,
        category: input.category,
        tags: input.tags,
        media: input.media,
        options: input.options,
        correct_answer,
    })
}

fn reindex(questions: &mut [Question]) {
    for (index, question) in questions.iter_mut().enumerate() {
        question.order = index as i32;
    }
}

pub(crate) fn validate_settings(settings: &QuizSettings) -> Result<(), EngineError> {
    if !(0..=100).contains(&settings.passing_score) {
        return Err(EngineError::InvalidSettings(format!(
            "passing_score must be within 0-100, got {}",
            settings.passing_score
        )));
    }
    if let Some(limit) = settings.time_limit_minutes {
        if limit < 1 {
            return Err(EngineError::InvalidSettings(format!(
                "time_limit_minutes must be at least 1, got {limit}"
            )));
        }
    }
    if settings.max_attempts < 1 {
        return Err(EngineError::InvalidSettings(format!(
            "max_attempts must be at least 1, got {}",
            settings.max_attempts
        )));
    }
    if settings.question_pool == Some(0) {
        return Err(EngineError::InvalidSettings(
            "question_pool must be at least 1 when set".to_string(),
        ));
    }
    Ok(())
}
