//! Store integration tests.
//!
//! Every scenario runs against both backends: the behavior of the store
//! traits is backend-agnostic even though the relational backend uses SQL
//! transactions and the document backend uses batch document writes.

mod common;

use common::both_backends;
use mmllo::model::{
    BoardUpdate, CardUpdate, MemberRole, NewBoard, NewCard, NewList, NewUser,
};
use mmllo::store::Stores;
use mmllo::{Id, IdKind, MmlloError};

async fn make_user(stores: &Stores, username: &str) -> mmllo::model::User {
    stores
        .users
        .create(&NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "hash".to_string(),
        })
        .await
        .unwrap()
}

async fn make_board(stores: &Stores, owner: &Id, title: &str) -> mmllo::model::Board {
    stores
        .boards
        .create(&NewBoard {
            title: title.to_string(),
            description: None,
            owner_id: owner.clone(),
            background: None,
        })
        .await
        .unwrap()
}

async fn make_list(stores: &Stores, board: &Id, title: &str) -> mmllo::model::List {
    stores
        .lists
        .create(&NewList {
            title: title.to_string(),
            board_id: board.clone(),
        })
        .await
        .unwrap()
}

async fn make_card(stores: &Stores, list: &Id, title: &str) -> mmllo::model::Card {
    stores
        .cards
        .create(&NewCard {
            title: title.to_string(),
            description: None,
            list_id: list.clone(),
            due_date: None,
            labels: Vec::new(),
        })
        .await
        .unwrap()
}

/// A well-formed id that no entity has.
fn missing_id(kind: IdKind) -> Id {
    match kind {
        IdKind::Int => Id::Int(999_999),
        IdKind::Text => Id::Text("00000000-0000-4000-8000-000000000000".to_string()),
    }
}

#[tokio::test]
async fn test_user_uniqueness() {
    for stores in both_backends().await {
        let user = make_user(&stores, "ada").await;
        assert_eq!(user.username, "ada");

        let dup = stores
            .users
            .create(&NewUser {
                username: "ada".to_string(),
                email: "other@example.com".to_string(),
                password: "hash".to_string(),
            })
            .await;
        assert!(matches!(dup, Err(MmlloError::Conflict(_))));

        let found = stores.users.find_by_username("ada").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        let by_email = stores
            .users
            .find_by_email("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);
    }
}

#[tokio::test]
async fn test_update_password_change_count() {
    for stores in both_backends().await {
        let user = make_user(&stores, "ada").await;
        assert!(stores
            .users
            .update_password(&user.id, "newhash")
            .await
            .unwrap());
        assert!(!stores
            .users
            .update_password(&missing_id(stores.id_kind), "newhash")
            .await
            .unwrap());

        let reread = stores.users.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(reread.password, "newhash");
    }
}

#[tokio::test]
async fn test_board_defaults_and_update() {
    for stores in both_backends().await {
        let owner = make_user(&stores, "owner").await;
        let board = make_board(&stores, &owner.id, "Project").await;
        assert_eq!(board.background, "#0079bf");
        assert!(!board.is_starred);

        let updated = stores
            .boards
            .update(
                &board.id,
                &BoardUpdate {
                    title: "Renamed".to_string(),
                    description: Some("notes".to_string()),
                    background: "#ff0000".to_string(),
                    is_starred: true,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.description.as_deref(), Some("notes"));
        assert!(updated.is_starred);

        let absent = stores
            .boards
            .update(
                &missing_id(stores.id_kind),
                &BoardUpdate {
                    title: "x".to_string(),
                    description: None,
                    background: "#0079bf".to_string(),
                    is_starred: false,
                },
            )
            .await
            .unwrap();
        assert!(absent.is_none());
    }
}

#[tokio::test]
async fn test_board_listing_starred_first() {
    for stores in both_backends().await {
        let owner = make_user(&stores, "owner").await;
        let member = make_user(&stores, "member").await;

        let first = make_board(&stores, &owner.id, "first").await;
        let second = make_board(&stores, &owner.id, "second").await;
        let shared = make_board(&stores, &member.id, "shared").await;
        stores
            .boards
            .add_member(&shared.id, &owner.id, MemberRole::Member)
            .await
            .unwrap();
        stores.boards.set_starred(&first.id, true).await.unwrap();

        let boards = stores.boards.find_by_user(&owner.id).await.unwrap();
        let titles: Vec<&str> = boards.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles.len(), 3);
        // Starred board leads; membership boards appear alongside owned ones.
        assert_eq!(titles[0], "first");
        assert!(titles.contains(&"second"));
        assert!(titles.contains(&"shared"));

        // The member only sees their own board.
        let member_boards = stores.boards.find_by_user(&member.id).await.unwrap();
        assert_eq!(member_boards.len(), 1);
        let _ = second;
    }
}

#[tokio::test]
async fn test_membership_lifecycle() {
    for stores in both_backends().await {
        let owner = make_user(&stores, "owner").await;
        let member = make_user(&stores, "member").await;
        let board = make_board(&stores, &owner.id, "Project").await;

        assert!(!stores
            .boards
            .is_member(&board.id, &member.id)
            .await
            .unwrap());
        stores
            .boards
            .add_member(&board.id, &member.id, MemberRole::Viewer)
            .await
            .unwrap();
        assert!(stores
            .boards
            .is_member(&board.id, &member.id)
            .await
            .unwrap());

        let dup = stores
            .boards
            .add_member(&board.id, &member.id, MemberRole::Admin)
            .await;
        assert!(matches!(dup, Err(MmlloError::Conflict(_))));

        let members = stores.boards.members(&board.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].username, "member");
        assert_eq!(members[0].role, MemberRole::Viewer);

        assert!(stores
            .boards
            .update_member_role(&board.id, &member.id, MemberRole::Admin)
            .await
            .unwrap());
        let members = stores.boards.members(&board.id).await.unwrap();
        assert_eq!(members[0].role, MemberRole::Admin);

        // The owner has no membership row to update or remove.
        assert!(!stores
            .boards
            .update_member_role(&board.id, &owner.id, MemberRole::Admin)
            .await
            .unwrap());
        assert!(!stores
            .boards
            .remove_member(&board.id, &owner.id)
            .await
            .unwrap());

        assert!(stores
            .boards
            .remove_member(&board.id, &member.id)
            .await
            .unwrap());
        assert!(!stores
            .boards
            .remove_member(&board.id, &member.id)
            .await
            .unwrap());
    }
}

#[tokio::test]
async fn test_list_positions_dense_through_lifecycle() {
    for stores in both_backends().await {
        let owner = make_user(&stores, "owner").await;
        let board = make_board(&stores, &owner.id, "Project").await;

        let todo = make_list(&stores, &board.id, "To Do").await;
        let doing = make_list(&stores, &board.id, "Doing").await;
        let done = make_list(&stores, &board.id, "Done").await;
        assert_eq!((todo.position, doing.position, done.position), (0, 1, 2));

        // Move Done to the front.
        let moved = stores
            .lists
            .move_list(&done.id, 0)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(moved.position, 0);
        let lists = stores.lists.find_by_board(&board.id).await.unwrap();
        let titles: Vec<&str> = lists.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Done", "To Do", "Doing"]);
        let positions: Vec<i64> = lists.iter().map(|l| l.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);

        // Delete the middle list; survivors re-pack.
        assert!(stores.lists.delete(&todo.id).await.unwrap());
        let lists = stores.lists.find_by_board(&board.id).await.unwrap();
        let pairs: Vec<(&str, i64)> = lists
            .iter()
            .map(|l| (l.title.as_str(), l.position))
            .collect();
        assert_eq!(pairs, vec![("Done", 0), ("Doing", 1)]);

        // A new list appends at the end of the re-packed set.
        let fresh = make_list(&stores, &board.id, "Later").await;
        assert_eq!(fresh.position, 2);

        assert!(!stores.lists.delete(&todo.id).await.unwrap());
        assert!(stores
            .lists
            .move_list(&missing_id(stores.id_kind), 0)
            .await
            .unwrap()
            .is_none());
    }
}

#[tokio::test]
async fn test_card_move_within_list() {
    for stores in both_backends().await {
        let owner = make_user(&stores, "owner").await;
        let board = make_board(&stores, &owner.id, "Project").await;
        let list = make_list(&stores, &board.id, "To Do").await;

        let a = make_card(&stores, &list.id, "A").await;
        let _b = make_card(&stores, &list.id, "B").await;
        let _c = make_card(&stores, &list.id, "C").await;
        let d = make_card(&stores, &list.id, "D").await;

        // [A, B, C, D] with D moved to slot 1 becomes [A, D, B, C].
        stores.cards.move_in_list(&d.id, 1).await.unwrap().unwrap();
        let cards = stores.cards.find_by_list(&list.id).await.unwrap();
        let titles: Vec<&str> = cards.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "D", "B", "C"]);
        let positions: Vec<i64> = cards.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);

        // Out-of-range positions clamp instead of failing.
        stores
            .cards
            .move_in_list(&a.id, 100)
            .await
            .unwrap()
            .unwrap();
        let cards = stores.cards.find_by_list(&list.id).await.unwrap();
        let titles: Vec<&str> = cards.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["D", "B", "C", "A"]);
    }
}

#[tokio::test]
async fn test_card_move_across_lists() {
    for stores in both_backends().await {
        let owner = make_user(&stores, "owner").await;
        let board = make_board(&stores, &owner.id, "Project").await;
        let todo = make_list(&stores, &board.id, "To Do").await;
        let doing = make_list(&stores, &board.id, "Doing").await;

        let a = make_card(&stores, &todo.id, "A").await;
        let _b = make_card(&stores, &todo.id, "B").await;
        let x = make_card(&stores, &doing.id, "X").await;

        let moved = stores
            .cards
            .move_to_list(&a.id, &doing.id, 0)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(moved.list_id, doing.id);
        assert_eq!(moved.position, 0);

        // Source gap closed.
        let source = stores.cards.find_by_list(&todo.id).await.unwrap();
        assert_eq!(source.len(), 1);
        assert_eq!(source[0].title, "B");
        assert_eq!(source[0].position, 0);

        // Target slot opened.
        let target = stores.cards.find_by_list(&doing.id).await.unwrap();
        let pairs: Vec<(&str, i64)> = target
            .iter()
            .map(|c| (c.title.as_str(), c.position))
            .collect();
        assert_eq!(pairs, vec![("A", 0), ("X", 1)]);

        // Target list must exist.
        let err = stores
            .cards
            .move_to_list(&x.id, &missing_id(stores.id_kind), 0)
            .await;
        assert!(matches!(err, Err(MmlloError::NotFound(_))));
    }
}

#[tokio::test]
async fn test_card_update_and_delete() {
    for stores in both_backends().await {
        let owner = make_user(&stores, "owner").await;
        let board = make_board(&stores, &owner.id, "Project").await;
        let list = make_list(&stores, &board.id, "To Do").await;
        let card = make_card(&stores, &list.id, "Task").await;
        let tail = make_card(&stores, &list.id, "Tail").await;

        let updated = stores
            .cards
            .update(
                &card.id,
                &CardUpdate {
                    title: "Task!".to_string(),
                    description: Some("details".to_string()),
                    due_date: Some("2026-09-01".to_string()),
                    labels: vec!["red".to_string(), "urgent".to_string()],
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Task!");
        assert_eq!(updated.labels, vec!["red", "urgent"]);

        assert!(stores.cards.delete(&card.id).await.unwrap());
        assert!(!stores.cards.delete(&card.id).await.unwrap());

        // Sibling re-packed down to slot zero.
        let reread = stores.cards.find_by_id(&tail.id).await.unwrap().unwrap();
        assert_eq!(reread.position, 0);
    }
}

#[tokio::test]
async fn test_comments() {
    for stores in both_backends().await {
        let owner = make_user(&stores, "owner").await;
        let board = make_board(&stores, &owner.id, "Project").await;
        let list = make_list(&stores, &board.id, "To Do").await;
        let card = make_card(&stores, &list.id, "Task").await;

        let comment = stores
            .cards
            .add_comment(&card.id, &owner.id, "first!")
            .await
            .unwrap();
        assert_eq!(comment.username, "owner");
        assert_eq!(comment.content, "first!");

        stores
            .cards
            .add_comment(&card.id, &owner.id, "second")
            .await
            .unwrap();

        let comments = stores.cards.comments(&card.id).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].content, "first!");
        assert_eq!(comments[1].content, "second");

        let absent = stores
            .cards
            .add_comment(&missing_id(stores.id_kind), &owner.id, "nope")
            .await;
        assert!(matches!(absent, Err(MmlloError::NotFound(_))));
    }
}

#[tokio::test]
async fn test_board_delete_cascades() {
    for stores in both_backends().await {
        let owner = make_user(&stores, "owner").await;
        let board = make_board(&stores, &owner.id, "Project").await;
        let list = make_list(&stores, &board.id, "To Do").await;
        let card = make_card(&stores, &list.id, "Task").await;
        stores
            .cards
            .add_comment(&card.id, &owner.id, "gone soon")
            .await
            .unwrap();

        assert!(stores.boards.delete(&board.id).await.unwrap());
        assert!(stores
            .boards
            .find_by_id(&board.id)
            .await
            .unwrap()
            .is_none());
        assert!(stores.lists.find_by_id(&list.id).await.unwrap().is_none());
        assert!(stores.cards.find_by_id(&card.id).await.unwrap().is_none());
        assert!(!stores.boards.delete(&board.id).await.unwrap());
    }
}

#[tokio::test]
async fn test_concurrent_card_moves_keep_positions_dense() {
    for stores in both_backends().await {
        let owner = make_user(&stores, "owner").await;
        let board = make_board(&stores, &owner.id, "Project").await;
        let list = make_list(&stores, &board.id, "To Do").await;
        let a = make_card(&stores, &list.id, "a").await;
        make_card(&stores, &list.id, "b").await;
        make_card(&stores, &list.id, "c").await;
        let d = make_card(&stores, &list.id, "d").await;

        // Two simultaneous moves on the same list. Each must read the
        // sibling set the other committed, never a shared stale snapshot.
        let (first, second) = tokio::join!(
            stores.cards.move_in_list(&d.id, 1),
            stores.cards.move_in_list(&a.id, 2),
        );
        first.unwrap().unwrap();
        second.unwrap().unwrap();

        let cards = stores.cards.find_by_list(&list.id).await.unwrap();
        let positions: Vec<i64> = cards.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3], "positions must stay dense");
    }
}

#[tokio::test]
async fn test_concurrent_list_move_and_delete_keep_positions_dense() {
    for stores in both_backends().await {
        let owner = make_user(&stores, "owner").await;
        let board = make_board(&stores, &owner.id, "Project").await;
        let first = make_list(&stores, &board.id, "one").await;
        let second = make_list(&stores, &board.id, "two").await;
        make_list(&stores, &board.id, "three").await;
        let fourth = make_list(&stores, &board.id, "four").await;

        let (moved, deleted) = tokio::join!(
            stores.lists.move_list(&fourth.id, 0),
            stores.lists.delete(&second.id),
        );
        moved.unwrap().unwrap();
        assert!(deleted.unwrap());

        let lists = stores.lists.find_by_board(&board.id).await.unwrap();
        assert_eq!(lists.len(), 3);
        let positions: Vec<i64> = lists.iter().map(|l| l.position).collect();
        assert_eq!(positions, vec![0, 1, 2], "positions must stay dense");
        assert!(lists.iter().any(|l| l.id == first.id));
    }
}
