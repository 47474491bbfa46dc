//! End-to-end visibility scenarios against the in-memory host.

use std::sync::Arc;

use private_topics::config::Settings;
use private_topics::models::{CategoryFilter, SearchPost, Topic, User};
use private_topics::repository::{HostStores, InMemoryHost};
use private_topics::visibility::{AccessGuard, ScopeResolver, SearchResultFilter};

const CATEGORY: i64 = 7;
const OPEN_CATEGORY: i64 = 8;

struct Forum {
    host: InMemoryHost,
    guard: AccessGuard,
    search: SearchResultFilter,
}

async fn setup(settings: Settings) -> Forum {
    let host = InMemoryHost::new();
    host.set_category(CategoryFilter::enabled(CATEGORY)).await;

    let stores = HostStores::from_host(Arc::new(host.clone()));
    let resolver = Arc::new(ScopeResolver::new(Arc::new(settings), &stores));
    Forum {
        host,
        guard: AccessGuard::new(resolver.clone()),
        search: SearchResultFilter::new(resolver),
    }
}

fn post(id: i64, user_id: i64, category_id: Option<i64>) -> SearchPost {
    SearchPost {
        id,
        topic_id: id * 10,
        user_id,
        category_id,
    }
}

#[tokio::test]
async fn owner_sees_topic_other_user_does_not() {
    let forum = setup(Settings::enabled()).await;
    let u1 = User::new(1);
    let u2 = User::new(2);
    forum.host.insert_user(u1.clone()).await;
    forum.host.insert_user(u2.clone()).await;
    let t1 = Topic::new(100, Some(CATEGORY), u1.id);

    assert!(forum.guard.can_see(Some(&u1), &t1, true).await);
    assert!(!forum.guard.can_see(Some(&u2), &t1, true).await);
    assert!(!forum.guard.can_see(None, &t1, true).await);
}

#[tokio::test]
async fn allowed_group_member_passes() {
    let forum = setup(Settings::enabled()).await;
    forum
        .host
        .set_category(CategoryFilter::enabled(CATEGORY).allow_groups([5]))
        .await;
    let member = User::new(2).with_groups([5]);
    let outsider = User::new(3).with_groups([6]);
    forum.host.insert_user(member.clone()).await;
    forum.host.insert_user(outsider.clone()).await;
    let topic = Topic::new(100, Some(CATEGORY), 1);

    assert!(forum.guard.can_see(Some(&member), &topic, true).await);
    assert!(!forum.guard.can_see(Some(&outsider), &topic, true).await);
}

#[tokio::test]
async fn permitted_group_members_own_topics_are_public() {
    let forum = setup(Settings::enabled().with_permitted_groups([9])).await;
    let staff = User::new(4).with_groups([9]);
    let reader = User::new(5);
    forum.host.insert_user(staff.clone()).await;
    forum.host.insert_user(reader.clone()).await;

    let staff_topic = Topic::new(100, Some(CATEGORY), staff.id);
    let other_topic = Topic::new(101, Some(CATEGORY), 1);

    assert!(forum.guard.can_see(Some(&reader), &staff_topic, true).await);
    assert!(!forum.guard.can_see(Some(&reader), &other_topic, true).await);
}

#[tokio::test]
async fn admin_bypass_only_when_enabled() {
    let admin = User::new(1).admin();
    let topic = Topic::new(100, Some(CATEGORY), 2);

    let forum = setup(Settings::enabled().with_admin_sees_all(true)).await;
    forum.host.insert_user(admin.clone()).await;
    assert!(forum.guard.can_see(Some(&admin), &topic, true).await);

    let forum = setup(Settings::enabled()).await;
    forum.host.insert_user(admin.clone()).await;
    assert!(!forum.guard.can_see(Some(&admin), &topic, true).await);
}

#[tokio::test]
async fn host_denial_is_never_overridden() {
    let forum = setup(Settings::enabled().with_admin_sees_all(true)).await;
    let admin = User::new(1).admin();
    let own = Topic::new(100, Some(OPEN_CATEGORY), admin.id);
    assert!(!forum.guard.can_see(Some(&admin), &own, false).await);
}

#[tokio::test]
async fn disabled_filtering_shows_everything() {
    let forum = setup(Settings::default()).await;
    let topic = Topic::new(100, Some(CATEGORY), 1);
    assert!(forum.guard.can_see(Some(&User::new(2)), &topic, true).await);
    assert!(forum.guard.can_see(None, &topic, true).await);
}

#[tokio::test]
async fn search_keeps_order_and_drops_hidden_posts() {
    let forum = setup(Settings::enabled()).await;
    let viewer = User::new(2);
    forum.host.insert_user(viewer.clone()).await;

    let posts = vec![
        post(1, 1, Some(CATEGORY)),
        post(2, 2, Some(CATEGORY)),
        post(3, 1, Some(OPEN_CATEGORY)),
        post(4, 3, None),
        post(5, 4, Some(CATEGORY)),
    ];

    let kept = forum.search.filter(Some(&viewer), posts).await;
    let ids: Vec<_> = kept.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![2, 3, 4]);
}

#[tokio::test]
async fn store_outage_fails_closed() {
    let forum = setup(Settings::enabled()).await;
    let viewer = User::new(2);
    forum.host.insert_user(viewer.clone()).await;
    forum.host.set_unavailable(true).await;

    let foreign = Topic::new(100, Some(OPEN_CATEGORY), 1);
    let own = Topic::new(101, Some(OPEN_CATEGORY), viewer.id);
    let uncategorized = Topic::new(102, None, 1);

    assert!(!forum.guard.can_see(Some(&viewer), &foreign, true).await);
    assert!(forum.guard.can_see(Some(&viewer), &own, true).await);
    assert!(forum.guard.can_see(Some(&viewer), &uncategorized, true).await);

    let kept = forum
        .search
        .filter(
            Some(&viewer),
            vec![post(1, 1, Some(OPEN_CATEGORY)), post(2, viewer.id, Some(OPEN_CATEGORY))],
        )
        .await;
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].id, 2);
}
