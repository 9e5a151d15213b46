//! Bundled content - compiled into the binary
//!
//! Last-resort fallback when neither the remote source nor a local copy
//! can provide a module. Only English is bundled.

use serde_json::{json, Value};

/// The only language with bundled content
pub const BUNDLED_LANGUAGE: &str = "en";

fn english(lang: &str, build: fn() -> Value) -> Option<Value> {
    (lang == BUNDLED_LANGUAGE).then(build)
}

pub(crate) fn book_chapters(lang: &str) -> Option<Value> {
    english(lang, || {
        json!({
            "chapters": [
                {
                    "chapterID": 1,
                    "chapterName": "Introduction",
                    "file": "chapter1.xhtml",
                    "summary": "What the exam covers and how this book is organised."
                },
                {
                    "chapterID": 2,
                    "chapterName": "Core Concepts",
                    "file": "chapter2.xhtml",
                    "summary": "The fundamentals every candidate must know."
                }
            ]
        })
    })
}

pub(crate) fn chapter_questions(lang: &str) -> Option<Value> {
    english(lang, || {
        json!({
            "data": {
                "chapter1": {
                    "chapterID": 1,
                    "chapterName": "Introduction",
                    "questions": [
                        {
                            "id": 101,
                            "type": "single",
                            "prompt": "How many chapters does the exam syllabus contain?",
                            "options": ["Two", "Five", "Ten", "Twelve"],
                            "correct_option_indexes": [2],
                            "min_selections": 1,
                            "max_selections": 1,
                            "explanation": "The syllabus is split into ten chapters.",
                            "hint": "Check the table of contents."
                        }
                    ]
                },
                "chapter2": {
                    "chapterID": 2,
                    "chapterName": "Core Concepts",
                    "questions": [
                        {
                            "id": 201,
                            "type": "multiple",
                            "prompt": "Which of the following are core concepts?",
                            "options": ["Definitions", "Weather", "Principles", "Trivia"],
                            "correct_option_indexes": [0, 2],
                            "min_selections": 2,
                            "max_selections": 2,
                            "explanation": "Definitions and principles form the core of chapter 2."
                        }
                    ]
                }
            }
        })
    })
}

pub(crate) fn mock_exam(lang: &str) -> Option<Value> {
    english(lang, || {
        json!({
            "data": {
                "chapter1": {
                    "chapterID": 1,
                    "chapterName": "Mock Exam",
                    "questions": [
                        {
                            "id": 9001,
                            "type": "single",
                            "prompt": "You may leave a question unanswered and return to it later.",
                            "options": ["True", "False"],
                            "correct_option_indexes": [0],
                            "min_selections": 1,
                            "max_selections": 1,
                            "explanation": "Unanswered questions can be revisited before submitting."
                        }
                    ]
                }
            }
        })
    })
}

pub(crate) fn privacy_policy(lang: &str) -> Option<Value> {
    english(lang, || {
        json!({
            "title": "Privacy Policy",
            "sections": [
                {
                    "heading": "Data we store",
                    "body": "Your answers and reading progress are stored on this device only."
                },
                {
                    "heading": "Downloaded content",
                    "body": "Exam questions and book chapters are downloaded from our content server. No personal data is sent with these requests."
                }
            ]
        })
    })
}

pub(crate) fn exam_help(lang: &str) -> Option<Value> {
    english(lang, || {
        json!({
            "title": "Exam Help",
            "articles": [
                {
                    "id": "help-multiple-answers",
                    "question": "How do questions with multiple answers work?",
                    "answer": "Select exactly as many options as the question asks for, then confirm."
                },
                {
                    "id": "help-hints",
                    "question": "Do hints affect my score?",
                    "answer": "No. Hints are for practice and do not change your result."
                }
            ]
        })
    })
}

pub(crate) fn getting_started(lang: &str) -> Option<Value> {
    english(lang, || {
        json!({
            "title": "Getting Started",
            "articles": [
                {
                    "id": "start-read",
                    "question": "Where do I start?",
                    "answer": "Read a chapter in the book, then practise with that chapter's questions."
                },
                {
                    "id": "start-languages",
                    "question": "Can I study in another language?",
                    "answer": "Yes. Download a language in Settings. English is always available offline."
                }
            ]
        })
    })
}
