//! 收件人解析
//!
//! 一个学生的可用号码分散在多处：成年学员本人、主/副家长、家长-学生关联上的
//! 专用号码，以及同一家长在其他关联上留下的号码。按固定顺序收集并去重。

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use super::phone::normalize_phone;
use crate::errors::Result;
use crate::models::parents::entities::Parent;
use crate::models::sms::entities::{Recipient, RecipientSource};
use crate::models::students::entities::Student;
use crate::storage::Storage;

struct RecipientCollector<'a> {
    country_code: &'a str,
    seen: HashSet<String>,
    recipients: Vec<Recipient>,
}

impl<'a> RecipientCollector<'a> {
    fn new(country_code: &'a str) -> Self {
        Self {
            country_code,
            seen: HashSet::new(),
            recipients: Vec::new(),
        }
    }

    /// 号码有效时返回 true，即使因重复而没有加入
    fn push(&mut self, raw: Option<&str>, name: Option<&str>, source: RecipientSource) -> bool {
        let Some(phone) = raw.and_then(|r| normalize_phone(r, self.country_code)) else {
            return false;
        };
        if self.seen.insert(phone.clone()) {
            self.recipients.push(Recipient {
                phone,
                name: name.map(str::to_string),
                source,
            });
        }
        true
    }
}

/// 解析学生的全部收件人，按发现顺序去重
pub async fn resolve_recipients(
    storage: &dyn Storage,
    student: &Student,
    country_code: &str,
) -> Result<Vec<Recipient>> {
    let mut collector = RecipientCollector::new(country_code);
    let mut parents: HashMap<i64, Option<Parent>> = HashMap::new();

    if student.is_adult {
        collector.push(
            student.phone.as_deref(),
            Some(&student.full_name),
            RecipientSource::AdultStudent,
        );
    }

    let direct = [
        (student.primary_parent_id, RecipientSource::PrimaryParent),
        (student.secondary_parent_id, RecipientSource::SecondaryParent),
    ];
    for (parent_id, source) in direct {
        if let Some(parent_id) = parent_id {
            collect_parent(
                storage,
                &mut collector,
                &mut parents,
                student,
                ParentPath {
                    parent_id,
                    contact_phone: None,
                    source,
                },
            )
            .await?;
        }
    }

    for link in storage.list_parent_links_for_student(student.id).await? {
        collect_parent(
            storage,
            &mut collector,
            &mut parents,
            student,
            ParentPath {
                parent_id: link.parent_id,
                contact_phone: link.contact_phone.as_deref(),
                source: RecipientSource::LinkedParent,
            },
        )
        .await?;
    }

    debug!(
        "Resolved {} recipient(s) for student {}",
        collector.recipients.len(),
        student.id
    );
    Ok(collector.recipients)
}

struct ParentPath<'a> {
    parent_id: i64,
    contact_phone: Option<&'a str>,
    source: RecipientSource,
}

async fn collect_parent(
    storage: &dyn Storage,
    collector: &mut RecipientCollector<'_>,
    parents: &mut HashMap<i64, Option<Parent>>,
    student: &Student,
    path: ParentPath<'_>,
) -> Result<()> {
    let parent = match parents.get(&path.parent_id) {
        Some(cached) => cached.clone(),
        None => {
            let loaded = storage.get_parent_by_id(path.parent_id).await?;
            parents.insert(path.parent_id, loaded.clone());
            loaded
        }
    };

    let Some(parent) = parent else {
        warn!(
            "Parent {} referenced by student {} does not exist, skipping",
            path.parent_id, student.id
        );
        return Ok(());
    };

    let name = Some(parent.full_name.as_str());
    let mut found = collector.push(path.contact_phone, name, path.source);
    found |= collector.push(parent.phone.as_deref(), name, path.source);
    found |= collector.push(parent.alternate_phone.as_deref(), name, path.source);
    if found {
        return Ok(());
    }

    // 本人没有有效号码，查找该家长与其他学生关联上的联系电话；
    // 本学生自己的关联由关联步骤处理
    let fallback = storage
        .list_parent_links_for_parent(parent.id)
        .await?
        .into_iter()
        .filter(|link| link.student_id != student.id)
        .find(|link| {
            collector.push(
                link.contact_phone.as_deref(),
                name,
                RecipientSource::ParentFallback,
            )
        });

    if fallback.is_none() {
        debug!("No usable phone number for parent {}", parent.id);
    }
    Ok(())
}
