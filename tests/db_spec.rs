use brainboard::db::Database;
use brainboard::models::*;
use speculate2::speculate;
use uuid::Uuid;

fn create_test_user(db: &Database, email: &str) -> User {
    db.create_user(NewUser {
        name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: Some("$argon2id$stub".to_string()),
        auth_provider: AuthProvider::Local,
    })
    .expect("Failed to create user")
}

fn new_task(title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: None,
        completed: false,
    }
}

fn note_content(title: &str) -> NoteContent {
    NoteContent {
        title: title.to_string(),
        text: "Body text".to_string(),
        original_note: None,
        summarized_note: "Summary".to_string(),
    }
}

fn plan(day: u32) -> DailyPlan {
    DailyPlan {
        day,
        title: format!("Day {day}"),
        description: "Study".to_string(),
        resources: vec!["Docs".to_string()],
    }
}

fn new_guide(topic: &str, days: &[u32]) -> NewLearningGuide {
    NewLearningGuide {
        topic: topic.to_string(),
        duration_days: days.len().max(1) as u32,
        daily_plan: days.iter().copied().map(plan).collect(),
    }
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "on disk" {
        it "keeps data across reopen" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("nested").join("brainboard.db");

            let first = Database::open(path.clone()).expect("Failed to open database");
            first.migrate().expect("Failed to run migrations");
            create_test_user(&first, "ada@example.com");
            drop(first);

            let second = Database::open(path).expect("Failed to reopen database");
            second.migrate().expect("Migrations should be idempotent");
            assert!(second.get_user_by_email("ada@example.com").unwrap().is_some());
        }
    }

    describe "users" {
        it "creates a local user and finds it by email" {
            let user = create_test_user(&db, "ada@example.com");
            let found = db.get_user_by_email("ada@example.com").expect("Query failed");
            assert_eq!(found.map(|u| u.id), Some(user.id));
            assert_eq!(user.auth_provider, AuthProvider::Local);
        }

        it "rejects a duplicate email" {
            create_test_user(&db, "ada@example.com");
            let err = db.create_user(NewUser {
                name: "Other".to_string(),
                email: "ada@example.com".to_string(),
                password_hash: Some("hash".to_string()),
                auth_provider: AuthProvider::Local,
            }).unwrap_err();
            assert_eq!(err.downcast_ref::<ModelError>(), Some(&ModelError::EmailTaken));
        }

        it "requires a password hash for local users" {
            let err = db.create_user(NewUser {
                name: "Nopass".to_string(),
                email: "nopass@example.com".to_string(),
                password_hash: None,
                auth_provider: AuthProvider::Local,
            }).unwrap_err();
            assert_eq!(err.downcast_ref::<ModelError>(), Some(&ModelError::PasswordRequired));
        }

        it "creates google users without a password" {
            let user = db.create_user(NewUser {
                name: "Grace".to_string(),
                email: "grace@example.com".to_string(),
                password_hash: None,
                auth_provider: AuthProvider::Google,
            }).expect("Failed to create google user");
            assert!(user.password_hash.is_none());
        }

        it "updates name and email" {
            let user = create_test_user(&db, "ada@example.com");
            let updated = db
                .update_user(user.id, Some("Ada L".to_string()), Some("lovelace@example.com".to_string()))
                .expect("Update failed")
                .expect("User missing");
            assert_eq!(updated.name, "Ada L");
            assert_eq!(updated.email, "lovelace@example.com");
            assert!(updated.password_hash.is_some());
        }

        it "refuses an email owned by another user" {
            let ada = create_test_user(&db, "ada@example.com");
            create_test_user(&db, "grace@example.com");
            let err = db
                .update_user(ada.id, None, Some("grace@example.com".to_string()))
                .unwrap_err();
            assert_eq!(err.downcast_ref::<ModelError>(), Some(&ModelError::EmailTaken));
        }
    }

    describe "tasks" {
        it "stores the owner as the task's user" {
            let user = create_test_user(&db, "ada@example.com");
            let task = db.create_task(user.id, new_task("Write tests")).expect("Create failed");
            assert_eq!(task.user_id, user.id);
            assert!(!task.completed);
        }

        it "lists tasks oldest first and only for the owner" {
            let ada = create_test_user(&db, "ada@example.com");
            let grace = create_test_user(&db, "grace@example.com");
            db.create_task(ada.id, new_task("First task")).unwrap();
            db.create_task(ada.id, new_task("Second task")).unwrap();
            db.create_task(grace.id, new_task("Grace task")).unwrap();

            let tasks = db.get_tasks(ada.id).expect("Query failed");
            let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
            assert_eq!(titles, vec!["First task", "Second task"]);
        }

        it "hides tasks from other users" {
            let ada = create_test_user(&db, "ada@example.com");
            let grace = create_test_user(&db, "grace@example.com");
            let task = db.create_task(ada.id, new_task("Private task")).unwrap();

            assert!(db.get_task(task.id, grace.id).unwrap().is_none());
            assert!(db.toggle_task(task.id, grace.id).unwrap().is_none());
            assert!(db.delete_task(task.id, grace.id).unwrap().is_none());
            assert!(db.update_task(task.id, grace.id, UpdateTaskInput::default()).unwrap().is_none());
            assert!(db.get_task(task.id, ada.id).unwrap().is_some());
        }

        it "applies partial updates" {
            let user = create_test_user(&db, "ada@example.com");
            let task = db.create_task(user.id, NewTask {
                title: "Original".to_string(),
                description: Some("keep me".to_string()),
                completed: false,
            }).unwrap();

            let updated = db.update_task(task.id, user.id, UpdateTaskInput {
                completed: Some(true),
                ..Default::default()
            }).unwrap().unwrap();

            assert_eq!(updated.title, "Original");
            assert_eq!(updated.description.as_deref(), Some("keep me"));
            assert!(updated.completed);
        }

        it "clears the description with an empty string" {
            let user = create_test_user(&db, "ada@example.com");
            let task = db.create_task(user.id, NewTask {
                title: "Original".to_string(),
                description: Some("remove me".to_string()),
                completed: false,
            }).unwrap();

            let updated = db.update_task(task.id, user.id, UpdateTaskInput {
                description: Some("   ".to_string()),
                ..Default::default()
            }).unwrap().unwrap();
            assert!(updated.description.is_none());
        }

        it "toggles completion back and forth" {
            let user = create_test_user(&db, "ada@example.com");
            let task = db.create_task(user.id, new_task("Toggle me")).unwrap();

            assert!(db.toggle_task(task.id, user.id).unwrap().unwrap().completed);
            assert!(!db.toggle_task(task.id, user.id).unwrap().unwrap().completed);
        }

        it "deletes all of one user's tasks" {
            let ada = create_test_user(&db, "ada@example.com");
            let grace = create_test_user(&db, "grace@example.com");
            db.create_task(ada.id, new_task("Task one")).unwrap();
            db.create_task(ada.id, new_task("Task two")).unwrap();
            db.create_task(grace.id, new_task("Task three")).unwrap();

            assert_eq!(db.delete_all_tasks(ada.id).unwrap(), 2);
            assert!(db.get_tasks(ada.id).unwrap().is_empty());
            assert_eq!(db.get_tasks(grace.id).unwrap().len(), 1);
        }
    }

    describe "notes" {
        it "creates notes with downloadedPdf false" {
            let user = create_test_user(&db, "ada@example.com");
            let note = db.create_note(user.id, note_content("Lecture")).unwrap();
            assert!(!note.downloaded_pdf);
            assert_eq!(note.summarized_note, "Summary");
        }

        it "lists notes newest first" {
            let user = create_test_user(&db, "ada@example.com");
            db.create_note(user.id, note_content("Older")).unwrap();
            db.create_note(user.id, note_content("Newer")).unwrap();

            let notes = db.get_notes(user.id).unwrap();
            assert_eq!(notes[0].title, "Newer");
            assert_eq!(notes[1].title, "Older");
        }

        it "updates only the owner's note" {
            let ada = create_test_user(&db, "ada@example.com");
            let grace = create_test_user(&db, "grace@example.com");
            let note = db.create_note(ada.id, note_content("Lecture")).unwrap();

            assert!(db.update_note(note.id, grace.id, note_content("Stolen")).unwrap().is_none());
            let updated = db.update_note(note.id, ada.id, note_content("Renamed")).unwrap().unwrap();
            assert_eq!(updated.title, "Renamed");
            assert_eq!(updated.created_at, note.created_at);
        }

        it "deletes only the owner's note" {
            let ada = create_test_user(&db, "ada@example.com");
            let grace = create_test_user(&db, "grace@example.com");
            let note = db.create_note(ada.id, note_content("Lecture")).unwrap();

            assert!(!db.delete_note(note.id, grace.id).unwrap());
            assert!(db.delete_note(note.id, ada.id).unwrap());
            assert!(db.get_note(note.id, ada.id).unwrap().is_none());
        }
    }

    describe "learning guides" {
        it "persists the daily plan" {
            let user = create_test_user(&db, "ada@example.com");
            let guide = db.create_learning_guide(user.id, new_guide("Rust", &[1, 2, 3])).unwrap();

            let found = db.get_learning_guide(guide.id, user.id).unwrap().unwrap();
            assert_eq!(found.daily_plan.len(), 3);
            assert_eq!(found.daily_plan[2].day, 3);
            assert_eq!(found.topic, "Rust");
        }

        it "rejects duplicate day numbers and stores nothing" {
            let user = create_test_user(&db, "ada@example.com");
            let err = db.create_learning_guide(user.id, new_guide("Rust", &[1, 2, 2])).unwrap_err();
            assert_eq!(err.downcast_ref::<ModelError>(), Some(&ModelError::DuplicateDay(2)));

            let (guides, total) = db.get_learning_guides(user.id, 1, 10).unwrap();
            assert!(guides.is_empty());
            assert_eq!(total, 0);
        }

        it "pages newest first" {
            let user = create_test_user(&db, "ada@example.com");
            for topic in ["One", "Two", "Three"] {
                db.create_learning_guide(user.id, new_guide(topic, &[1])).unwrap();
            }

            let (first, total) = db.get_learning_guides(user.id, 1, 2).unwrap();
            assert_eq!(total, 3);
            assert_eq!(first.iter().map(|g| g.topic.as_str()).collect::<Vec<_>>(), vec!["Three", "Two"]);

            let (second, _) = db.get_learning_guides(user.id, 2, 2).unwrap();
            assert_eq!(second.len(), 1);
            assert_eq!(second[0].topic, "One");
        }

        it "scopes reads and deletes to the owner" {
            let ada = create_test_user(&db, "ada@example.com");
            let grace = create_test_user(&db, "grace@example.com");
            let guide = db.create_learning_guide(ada.id, new_guide("Rust", &[1])).unwrap();

            assert!(db.get_learning_guide(guide.id, grace.id).unwrap().is_none());
            assert!(!db.delete_learning_guide(guide.id, grace.id).unwrap());
            assert_eq!(db.delete_all_learning_guides(grace.id).unwrap(), 0);
            assert!(db.delete_learning_guide(guide.id, ada.id).unwrap());
        }
    }

    describe "stats" {
        it "counts each entity for the user only" {
            let ada = create_test_user(&db, "ada@example.com");
            let grace = create_test_user(&db, "grace@example.com");

            let done = db.create_task(ada.id, new_task("Done task")).unwrap();
            db.toggle_task(done.id, ada.id).unwrap();
            db.create_task(ada.id, new_task("Open task")).unwrap();
            db.create_task(ada.id, new_task("Open task two")).unwrap();
            db.create_note(ada.id, note_content("Lecture")).unwrap();
            db.create_learning_guide(ada.id, new_guide("Rust", &[1])).unwrap();
            db.create_task(grace.id, new_task("Grace task")).unwrap();

            let stats = db.get_user_stats(ada.id).unwrap();
            assert_eq!(stats, UserStats {
                total_notes: 1,
                total_tasks: 3,
                completed_tasks: 1,
                pending_tasks: 2,
                ai_learnings: 1,
            });
        }

        it "is all zeros for a fresh user" {
            let stats = db.get_user_stats(Uuid::new_v4()).unwrap();
            assert_eq!(stats.total_tasks, 0);
            assert_eq!(stats.ai_learnings, 0);
        }
    }
}
