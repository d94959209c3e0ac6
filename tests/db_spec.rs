use speculate2::speculate;
use taskdeck::db::Database;
use taskdeck::models::*;

fn create_test_project(db: &Database) -> Project {
    db.create_project(CreateProjectInput {
        name: "Test Project".to_string(),
        description: None,
        workflow: None,
    })
    .expect("Failed to create project")
}

fn create_test_task(db: &Database, project_id: i64) -> Task {
    db.create_task(
        project_id,
        CreateTaskInput {
            title: "Test Task".to_string(),
            ..Default::default()
        },
    )
    .expect("Failed to create task")
}

fn notify(db: &Database, user_id: i64) -> Notification {
    db.create_notification(NewNotification {
        user_id,
        kind: NotificationKind::StatusChange,
        title: "Task moved to IN_REVIEW".to_string(),
        message: "\"Test Task\" moved from IN_PROGRESS to IN_REVIEW".to_string(),
    })
    .expect("Failed to create notification")
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "projects" {
        describe "create_project" {
            it "creates a project with required fields" {
                let project = db.create_project(CreateProjectInput {
                    name: "My Project".to_string(),
                    description: None,
                    workflow: None,
                }).expect("Failed to create project");

                assert_eq!(project.name, "My Project");
                assert!(project.description.is_none());
            }

            it "defaults to the automated workflow" {
                let project = create_test_project(&db);
                assert_eq!(project.workflow, WorkflowKind::Automated);
            }

            it "creates a project with a custom workflow" {
                let project = db.create_project(CreateProjectInput {
                    name: "Freeform".to_string(),
                    description: Some("No automation here".to_string()),
                    workflow: Some(WorkflowKind::Custom),
                }).expect("Failed to create project");

                assert_eq!(project.workflow, WorkflowKind::Custom);
                assert_eq!(project.description, Some("No automation here".to_string()));
            }

            it "rejects an empty name" {
                let result = db.create_project(CreateProjectInput {
                    name: "   ".to_string(),
                    description: None,
                    workflow: None,
                });
                assert!(result.is_err());
            }
        }

        describe "get_project" {
            it "returns None for non-existent project" {
                let result = db.get_project(9999).expect("Query failed");
                assert!(result.is_none());
            }

            it "returns the project by id" {
                let created = create_test_project(&db);
                let found = db.get_project(created.id).expect("Query failed");
                assert_eq!(found.expect("Project missing").name, "Test Project");
            }
        }

        describe "get_all_projects" {
            it "returns empty list when no projects exist" {
                let projects = db.get_all_projects().expect("Query failed");
                assert!(projects.is_empty());
            }

            it "returns all projects ordered by name" {
                for name in ["Zebra", "Alpha", "Mango"] {
                    db.create_project(CreateProjectInput {
                        name: name.to_string(),
                        description: None,
                        workflow: None,
                    }).expect("Failed to create");
                }

                let projects = db.get_all_projects().expect("Query failed");
                let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
                assert_eq!(names, vec!["Alpha", "Mango", "Zebra"]);
            }
        }

        describe "update_project" {
            it "updates provided fields and keeps the rest" {
                let created = db.create_project(CreateProjectInput {
                    name: "Before".to_string(),
                    description: Some("Original".to_string()),
                    workflow: None,
                }).expect("Failed to create");

                let updated = db.update_project(created.id, UpdateProjectInput {
                    name: Some("After".to_string()),
                    description: None,
                }).expect("Update failed").expect("Project missing");

                assert_eq!(updated.name, "After");
                assert_eq!(updated.description, Some("Original".to_string()));
            }

            it "never changes the workflow mode" {
                let created = db.create_project(CreateProjectInput {
                    name: "Fixed".to_string(),
                    description: None,
                    workflow: Some(WorkflowKind::Custom),
                }).expect("Failed to create");

                let updated = db.update_project(created.id, UpdateProjectInput {
                    name: Some("Still Fixed".to_string()),
                    description: None,
                }).expect("Update failed").expect("Project missing");

                assert_eq!(updated.workflow, WorkflowKind::Custom);
                let reread = db.get_project(created.id).expect("Query failed").expect("Project missing");
                assert_eq!(reread.workflow, WorkflowKind::Custom);
            }

            it "returns None for non-existent project" {
                let result = db.update_project(9999, UpdateProjectInput {
                    name: Some("Ghost".to_string()),
                    description: None,
                }).expect("Update failed");
                assert!(result.is_none());
            }
        }

        describe "delete_project" {
            it "deletes the project and its dependents" {
                let project = create_test_project(&db);
                let task = create_test_task(&db, project.id);
                db.create_subtask(task.id, CreateSubtaskInput {
                    title: "Step".to_string(),
                    position: None,
                }).expect("Failed to create subtask");

                assert!(db.delete_project(project.id).expect("Delete failed"));
                assert!(db.get_task(task.id).expect("Query failed").is_none());
                assert!(db.get_subtasks_by_task(task.id).expect("Query failed").is_empty());
            }

            it "returns false for non-existent project" {
                assert!(!db.delete_project(9999).expect("Delete failed"));
            }
        }
    }

    describe "project_members" {
        describe "add_member" {
            it "adds a member with the default role" {
                let project = create_test_project(&db);
                let member = db.add_member(project.id, AddMemberInput {
                    user_id: 42,
                    role: None,
                }).expect("Failed to add member");

                assert_eq!(member.user_id, 42);
                assert_eq!(member.role, MemberRole::Member);
            }

            it "rejects a member on a missing project" {
                let result = db.add_member(9999, AddMemberInput {
                    user_id: 42,
                    role: None,
                });
                assert!(result.is_err());
            }

            it "rejects the same user twice on one project" {
                let project = create_test_project(&db);
                db.add_member(project.id, AddMemberInput { user_id: 42, role: None })
                    .expect("Failed to add member");
                let second = db.add_member(project.id, AddMemberInput { user_id: 42, role: None });
                assert!(second.is_err());
            }
        }

        describe "get_project_members" {
            it "lists members in join order" {
                let project = create_test_project(&db);
                for user_id in [7, 3, 11] {
                    db.add_member(project.id, AddMemberInput { user_id, role: None })
                        .expect("Failed to add member");
                }

                let members = db.get_project_members(project.id).expect("Query failed");
                let ids: Vec<i64> = members.iter().map(|m| m.user_id).collect();
                assert_eq!(ids, vec![7, 3, 11]);
            }
        }

        describe "remove_member" {
            it "removes a member by membership id" {
                let project = create_test_project(&db);
                let member = db.add_member(project.id, AddMemberInput { user_id: 42, role: None })
                    .expect("Failed to add member");

                assert!(db.remove_member(member.id).expect("Remove failed"));
                assert!(db.get_project_members(project.id).expect("Query failed").is_empty());
            }
        }
    }

    describe "custom_columns" {
        it "assigns increasing positions by default" {
            let project = create_test_project(&db);
            let first = db.create_column(project.id, CreateColumnInput {
                name: "Waiting".to_string(),
                position: None,
            }).expect("Failed to create column");
            let second = db.create_column(project.id, CreateColumnInput {
                name: "Blocked".to_string(),
                position: None,
            }).expect("Failed to create column");

            assert_eq!(first.position, 0);
            assert_eq!(second.position, 1);
        }

        it "updates name and position" {
            let project = create_test_project(&db);
            let column = db.create_column(project.id, CreateColumnInput {
                name: "Waiting".to_string(),
                position: None,
            }).expect("Failed to create column");

            let updated = db.update_column(column.id, UpdateColumnInput {
                name: Some("On Hold".to_string()),
                position: Some(5),
            }).expect("Update failed").expect("Column missing");

            assert_eq!(updated.name, "On Hold");
            assert_eq!(updated.position, 5);
        }

        it "clears column_id on tasks when the column is deleted" {
            let project = create_test_project(&db);
            let column = db.create_column(project.id, CreateColumnInput {
                name: "Waiting".to_string(),
                position: None,
            }).expect("Failed to create column");
            let task = db.create_task(project.id, CreateTaskInput {
                title: "Parked".to_string(),
                column_id: Some(column.id),
                ..Default::default()
            }).expect("Failed to create task");

            assert!(db.delete_column(column.id).expect("Delete failed"));
            let reread = db.get_task(task.id).expect("Query failed").expect("Task missing");
            assert!(reread.column_id.is_none());
        }
    }

    describe "tasks" {
        describe "create_task" {
            it "applies defaults for status and priority" {
                let project = create_test_project(&db);
                let task = create_test_task(&db, project.id);

                assert_eq!(task.status, TaskStatus::Backlog);
                assert_eq!(task.priority, TaskPriority::Medium);
                assert!(task.tags.is_empty());
            }

            it "assigns increasing board positions" {
                let project = create_test_project(&db);
                let first = create_test_task(&db, project.id);
                let second = create_test_task(&db, project.id);

                assert_eq!(first.position, 0);
                assert_eq!(second.position, 1);
            }

            it "persists tags" {
                let project = create_test_project(&db);
                let task = db.create_task(project.id, CreateTaskInput {
                    title: "Tagged".to_string(),
                    tags: vec!["backend".to_string(), "urgent".to_string()],
                    ..Default::default()
                }).expect("Failed to create task");

                let reread = db.get_task(task.id).expect("Query failed").expect("Task missing");
                assert_eq!(reread.tags, vec!["backend".to_string(), "urgent".to_string()]);
            }

            it "rejects a task on a missing project" {
                let result = db.create_task(9999, CreateTaskInput {
                    title: "Orphan".to_string(),
                    ..Default::default()
                });
                assert!(result.is_err());
            }
        }

        describe "update_task" {
            it "merges partial updates over existing fields" {
                let project = create_test_project(&db);
                let task = db.create_task(project.id, CreateTaskInput {
                    title: "Original".to_string(),
                    description: Some("Keep me".to_string()),
                    priority: Some(TaskPriority::High),
                    ..Default::default()
                }).expect("Failed to create task");

                let updated = db.update_task(task.id, UpdateTaskInput {
                    title: Some("Renamed".to_string()),
                    ..Default::default()
                }).expect("Update failed").expect("Task missing");

                assert_eq!(updated.title, "Renamed");
                assert_eq!(updated.description, Some("Keep me".to_string()));
                assert_eq!(updated.priority, TaskPriority::High);
            }

            it "changes status when asked" {
                let project = create_test_project(&db);
                let task = create_test_task(&db, project.id);

                let updated = db.update_task(task.id, UpdateTaskInput {
                    status: Some(TaskStatus::Completed),
                    ..Default::default()
                }).expect("Update failed").expect("Task missing");

                assert_eq!(updated.status, TaskStatus::Completed);
            }
        }

        describe "set_task_status" {
            it "writes only the status" {
                let project = create_test_project(&db);
                let task = create_test_task(&db, project.id);

                assert!(db.set_task_status(task.id, TaskStatus::InReview).expect("Write failed"));
                let reread = db.get_task(task.id).expect("Query failed").expect("Task missing");
                assert_eq!(reread.status, TaskStatus::InReview);
                assert_eq!(reread.title, "Test Task");
            }

            it "returns false for non-existent task" {
                assert!(!db.set_task_status(9999, TaskStatus::InReview).expect("Write failed"));
            }
        }

        describe "get_task_with_subtasks" {
            it "returns the task with its checklist in order" {
                let project = create_test_project(&db);
                let task = create_test_task(&db, project.id);
                for title in ["first", "second"] {
                    db.create_subtask(task.id, CreateSubtaskInput {
                        title: title.to_string(),
                        position: None,
                    }).expect("Failed to create subtask");
                }

                let detail = db.get_task_with_subtasks(task.id)
                    .expect("Query failed")
                    .expect("Task missing");
                assert_eq!(detail.subtasks.len(), 2);
                assert_eq!(detail.subtasks[0].title, "first");
                assert_eq!(detail.subtasks[1].title, "second");
            }
        }

        describe "delete_task" {
            it "cascades to subtasks and comments" {
                let project = create_test_project(&db);
                let task = create_test_task(&db, project.id);
                db.create_subtask(task.id, CreateSubtaskInput {
                    title: "Step".to_string(),
                    position: None,
                }).expect("Failed to create subtask");
                db.create_comment(task.id, CreateCommentInput {
                    author_id: 1,
                    content: "Looks good".to_string(),
                }).expect("Failed to create comment");

                assert!(db.delete_task(task.id).expect("Delete failed"));
                assert!(db.get_subtasks_by_task(task.id).expect("Query failed").is_empty());
                assert!(db.get_comments_by_task(task.id).expect("Query failed").is_empty());
            }
        }
    }

    describe "subtasks" {
        it "starts incomplete" {
            let project = create_test_project(&db);
            let task = create_test_task(&db, project.id);
            let subtask = db.create_subtask(task.id, CreateSubtaskInput {
                title: "Step".to_string(),
                position: None,
            }).expect("Failed to create subtask");

            assert!(!subtask.completed);
        }

        it "toggles completion through update" {
            let project = create_test_project(&db);
            let task = create_test_task(&db, project.id);
            let subtask = db.create_subtask(task.id, CreateSubtaskInput {
                title: "Step".to_string(),
                position: None,
            }).expect("Failed to create subtask");

            let done = db.update_subtask(subtask.id, UpdateSubtaskInput {
                completed: Some(true),
                ..Default::default()
            }).expect("Update failed").expect("Subtask missing");
            assert!(done.completed);

            let reopened = db.update_subtask(subtask.id, UpdateSubtaskInput {
                completed: Some(false),
                ..Default::default()
            }).expect("Update failed").expect("Subtask missing");
            assert!(!reopened.completed);
        }

        it "rejects a subtask on a missing task" {
            let result = db.create_subtask(9999, CreateSubtaskInput {
                title: "Orphan".to_string(),
                position: None,
            });
            assert!(result.is_err());
        }
    }

    describe "notes" {
        it "creates and rereads a note" {
            let project = create_test_project(&db);
            let note = db.create_note(project.id, CreateNoteInput {
                title: "Retro".to_string(),
                content: "Went well".to_string(),
            }).expect("Failed to create note");

            let found = db.get_note(note.id).expect("Query failed").expect("Note missing");
            assert_eq!(found.title, "Retro");
            assert_eq!(found.content, "Went well");
        }

        it "updates content in place" {
            let project = create_test_project(&db);
            let note = db.create_note(project.id, CreateNoteInput {
                title: "Retro".to_string(),
                content: "Went well".to_string(),
            }).expect("Failed to create note");

            let updated = db.update_note(note.id, UpdateNoteInput {
                title: None,
                content: Some("Went badly".to_string()),
            }).expect("Update failed").expect("Note missing");

            assert_eq!(updated.title, "Retro");
            assert_eq!(updated.content, "Went badly");
        }
    }

    describe "activity_trail" {
        it "lists entries newest first" {
            let project = create_test_project(&db);
            let task = create_test_task(&db, project.id);

            db.insert_activity(&NewActivity::status_change(
                project.id, task.id, task.title.clone(),
                TaskStatus::Backlog, TaskStatus::InProgress,
            )).expect("Insert failed");
            db.insert_activity(&NewActivity::status_change(
                project.id, task.id, task.title.clone(),
                TaskStatus::InProgress, TaskStatus::InReview,
            )).expect("Insert failed");

            let trail = db.project_activity(project.id).expect("Query failed");
            assert_eq!(trail.len(), 2);
            assert_eq!(trail[0].new_value, "IN_REVIEW");
            assert_eq!(trail[1].new_value, "IN_PROGRESS");
        }

        it "keeps entries after the task is deleted" {
            let project = create_test_project(&db);
            let task = create_test_task(&db, project.id);
            db.insert_activity(&NewActivity::status_change(
                project.id, task.id, task.title.clone(),
                TaskStatus::Backlog, TaskStatus::InReview,
            )).expect("Insert failed");

            db.delete_task(task.id).expect("Delete failed");

            let trail = db.project_activity(project.id).expect("Query failed");
            assert_eq!(trail.len(), 1);
            assert_eq!(trail[0].task_title, "Test Task");
        }
    }

    describe "notifications" {
        describe "unread_count" {
            it "counts only unread rows for the user" {
                for _ in 0..3 {
                    notify(&db, 1);
                }
                notify(&db, 2);

                assert_eq!(db.unread_count(1).expect("Count failed"), 3);
                assert_eq!(db.unread_count(2).expect("Count failed"), 1);
                assert_eq!(db.unread_count(3).expect("Count failed"), 0);
            }
        }

        describe "mark_notification_read" {
            it "drops the unread count by exactly one" {
                let n = notify(&db, 1);
                notify(&db, 1);

                assert!(db.mark_notification_read(n.id).expect("Mark failed"));
                assert_eq!(db.unread_count(1).expect("Count failed"), 1);
            }

            it "is idempotent" {
                let n = notify(&db, 1);

                assert!(db.mark_notification_read(n.id).expect("Mark failed"));
                assert!(db.mark_notification_read(n.id).expect("Mark failed"));
                assert_eq!(db.unread_count(1).expect("Count failed"), 0);

                let reread = db.get_notification(n.id).expect("Query failed").expect("Notification missing");
                assert!(reread.is_read);
            }

            it "returns false for non-existent notification" {
                assert!(!db.mark_notification_read(9999).expect("Mark failed"));
            }
        }

        describe "mark_all_notifications_read" {
            it "clears the unread count in one step" {
                for _ in 0..5 {
                    notify(&db, 1);
                }

                let marked = db.mark_all_notifications_read(1).expect("Mark failed");
                assert_eq!(marked, 5);
                assert_eq!(db.unread_count(1).expect("Count failed"), 0);
            }

            it "reports zero when nothing was unread" {
                notify(&db, 1);
                db.mark_all_notifications_read(1).expect("Mark failed");

                let marked = db.mark_all_notifications_read(1).expect("Mark failed");
                assert_eq!(marked, 0);
            }

            it "leaves other users untouched" {
                notify(&db, 1);
                notify(&db, 2);

                db.mark_all_notifications_read(1).expect("Mark failed");
                assert_eq!(db.unread_count(2).expect("Count failed"), 1);
            }
        }

        describe "delete_notification" {
            it "removes an unread notification from the count" {
                let n = notify(&db, 1);
                notify(&db, 1);

                assert!(db.delete_notification(n.id).expect("Delete failed"));
                assert_eq!(db.unread_count(1).expect("Count failed"), 1);
            }

            it "leaves the count alone when the notification was read" {
                let n = notify(&db, 1);
                notify(&db, 1);
                db.mark_notification_read(n.id).expect("Mark failed");

                assert!(db.delete_notification(n.id).expect("Delete failed"));
                assert_eq!(db.unread_count(1).expect("Count failed"), 1);
            }
        }

        describe "list_notifications" {
            it "pages newest first" {
                for i in 0..25 {
                    db.create_notification(NewNotification {
                        user_id: 1,
                        kind: NotificationKind::StatusChange,
                        title: format!("Notification {i}"),
                        message: "msg".to_string(),
                    }).expect("Failed to create notification");
                }

                let first_page = db.list_notifications(1, 1, 20).expect("Query failed");
                assert_eq!(first_page.len(), 20);
                assert_eq!(first_page[0].title, "Notification 24");

                let second_page = db.list_notifications(1, 2, 20).expect("Query failed");
                assert_eq!(second_page.len(), 5);
                assert_eq!(second_page[4].title, "Notification 0");
            }

            it "only returns the requested user's rows" {
                notify(&db, 1);
                notify(&db, 2);

                let rows = db.list_notifications(1, 1, 20).expect("Query failed");
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].user_id, 1);
            }
        }
    }
}
