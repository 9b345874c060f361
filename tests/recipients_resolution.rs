mod common;

use common::{MockStorage, student};
use rust_quran_portal::models::sms::entities::RecipientSource;
use rust_quran_portal::notify::resolve_recipients;

fn phones_and_sources(
    recipients: &[rust_quran_portal::models::sms::entities::Recipient],
) -> Vec<(&str, RecipientSource)> {
    recipients
        .iter()
        .map(|r| (r.phone.as_str(), r.source))
        .collect()
}

#[tokio::test]
async fn collects_in_discovery_order_without_duplicates() {
    let storage = MockStorage::new();
    storage.add_parent(10, "Khadija", Some("07700900002"), Some("+44 7700 900002"));
    storage.add_parent(11, "Omar", Some("07700 900003"), None);
    let mut amina = student(1, "Amina Rahman", Some(1));
    amina.is_adult = true;
    amina.phone = Some("07700 900001".to_string());
    amina.primary_parent_id = Some(10);
    amina.secondary_parent_id = Some(11);
    storage.add_student(amina.clone());
    storage.add_link(1, 10, 1, Some("07700900004"));

    let recipients = resolve_recipients(&storage, &amina, "44").await.unwrap();

    assert_eq!(
        phones_and_sources(&recipients),
        vec![
            ("+447700900001", RecipientSource::AdultStudent),
            ("+447700900002", RecipientSource::PrimaryParent),
            ("+447700900003", RecipientSource::SecondaryParent),
            ("+447700900004", RecipientSource::LinkedParent),
        ]
    );
    assert_eq!(recipients[0].name.as_deref(), Some("Amina Rahman"));
    assert_eq!(recipients[3].name.as_deref(), Some("Khadija"));
}

#[tokio::test]
async fn falls_back_to_parent_contact_on_other_links() {
    let storage = MockStorage::new();
    storage.add_parent(20, "Hafsa", None, Some("n/a"));
    let mut ibrahim = student(2, "Ibrahim", Some(1));
    ibrahim.primary_parent_id = Some(20);
    storage.add_student(ibrahim.clone());
    storage.add_student(student(3, "Sumayyah", Some(1)));
    // 兄弟姐妹的关联上留有号码
    storage.add_link(5, 20, 3, Some("07700 900020"));

    let recipients = resolve_recipients(&storage, &ibrahim, "44").await.unwrap();

    assert_eq!(
        phones_and_sources(&recipients),
        vec![("+447700900020", RecipientSource::ParentFallback)]
    );
    assert_eq!(recipients[0].name.as_deref(), Some("Hafsa"));
}

#[tokio::test]
async fn fallback_ignores_the_link_being_resolved() {
    let storage = MockStorage::new();
    storage.add_parent(30, "Yahya", Some("12"), None);
    let zainab = student(4, "Zainab", Some(1));
    storage.add_student(zainab.clone());
    // 该关联的号码无效，回退时不应重复检查它
    storage.add_link(8, 30, 4, Some("0"));
    storage.add_link(9, 30, 5, Some("+966 50 123 4567"));

    let recipients = resolve_recipients(&storage, &zainab, "44").await.unwrap();

    assert_eq!(
        phones_and_sources(&recipients),
        vec![("+966501234567", RecipientSource::ParentFallback)]
    );
}

#[tokio::test]
async fn skips_missing_parents_and_minor_phones() {
    let storage = MockStorage::new();
    let mut musa = student(6, "Musa", Some(1));
    // 未成年学员本人的号码不使用
    musa.phone = Some("07700900050".to_string());
    musa.primary_parent_id = Some(99);
    storage.add_student(musa.clone());
    storage.add_link(7, 98, 6, None);

    let recipients = resolve_recipients(&storage, &musa, "44").await.unwrap();
    assert!(recipients.is_empty());
}

#[tokio::test]
async fn same_parent_through_primary_and_link_is_listed_once() {
    let storage = MockStorage::new();
    storage.add_parent(40, "Aisha", Some("07700 900040"), None);
    let mut nuh = student(7, "Nuh", Some(1));
    nuh.primary_parent_id = Some(40);
    storage.add_student(nuh.clone());
    storage.add_link(11, 40, 7, None);

    let recipients = resolve_recipients(&storage, &nuh, "44").await.unwrap();

    assert_eq!(
        phones_and_sources(&recipients),
        vec![("+447700900040", RecipientSource::PrimaryParent)]
    );
}

#[tokio::test]
async fn own_link_contact_is_a_linked_parent_not_a_fallback() {
    let storage = MockStorage::new();
    storage.add_parent(20, "Hafsa", None, None);
    let mut ibrahim = student(2, "Ibrahim", Some(1));
    ibrahim.primary_parent_id = Some(20);
    storage.add_student(ibrahim.clone());
    storage.add_link(5, 20, 2, Some("07700 900020"));

    let recipients = resolve_recipients(&storage, &ibrahim, "44").await.unwrap();

    assert_eq!(
        phones_and_sources(&recipients),
        vec![("+447700900020", RecipientSource::LinkedParent)]
    );
}
