//! Mutex-guarded tables mirroring the relational schema.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::ports::{
    PhotoRepository, PhotoRepositoryError, ProjectPage, ProjectRepository, ProjectRepositoryError,
    StoredCredentials, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AssetId, EmailAddress, Photo, PhotoFlag, PhotoId, Project, ProjectId, User, UserId, Username,
};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, (User, String)>,
    projects: BTreeMap<ProjectId, Project>,
    photos: BTreeMap<PhotoId, Photo>,
}

impl Tables {
    fn photos_of(&self, project: &ProjectId) -> Vec<&Photo> {
        let mut photos: Vec<&Photo> = self
            .photos
            .values()
            .filter(|photo| photo.project_id == *project)
            .collect();
        photos.sort_by_key(|photo| (photo.display_order, photo.uploaded_at));
        photos
    }

    fn check_unique(&self, user: &User) -> Result<(), UserPersistenceError> {
        for (other, _) in self.users.values().filter(|(other, _)| other.id != user.id) {
            if other.username == user.username {
                return Err(UserPersistenceError::duplicate_username(
                    user.username.as_ref(),
                ));
            }
            let shared_email = user
                .email
                .as_ref()
                .filter(|email| other.email.as_ref() == Some(*email));
            if let Some(email) = shared_email {
                return Err(UserPersistenceError::duplicate_email(email.as_ref()));
            }
        }
        Ok(())
    }
}

/// Shared in-memory implementation of the user, project, and photo ports.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use lightbox::outbound::memory::InMemoryRepository;
///
/// let tables = Arc::new(InMemoryRepository::default());
/// let users = Arc::clone(&tables);
/// let projects = Arc::clone(&tables);
/// # let _ = (users, projects);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    tables: Mutex<Tables>,
}

impl InMemoryRepository {
    fn lock<E>(&self, poisoned: impl FnOnce(String) -> E) -> Result<MutexGuard<'_, Tables>, E> {
        self.tables
            .lock()
            .map_err(|_| poisoned("in-memory tables poisoned".to_owned()))
    }

    /// Number of stored photos across all projects.
    pub fn photo_count(&self) -> usize {
        self.tables
            .lock()
            .map(|tables| tables.photos.len())
            .unwrap_or_default()
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn insert(&self, user: &User, password_hash: &str) -> Result<(), UserPersistenceError> {
        let mut tables = self.lock(UserPersistenceError::query)?;
        tables.check_unique(user)?;
        if tables.users.contains_key(&user.id) {
            return Err(UserPersistenceError::query(format!(
                "user {} already exists",
                user.id
            )));
        }
        tables
            .users
            .insert(user.id.clone(), (user.clone(), password_hash.to_owned()));
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let tables = self.lock(UserPersistenceError::query)?;
        Ok(tables.users.get(id).map(|(user, _)| user.clone()))
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let tables = self.lock(UserPersistenceError::query)?;
        Ok(tables
            .users
            .values()
            .find(|(user, _)| user.username == *username)
            .map(|(user, hash)| StoredCredentials {
                user_id: user.id.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn email_owner(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserId>, UserPersistenceError> {
        let tables = self.lock(UserPersistenceError::query)?;
        Ok(tables
            .users
            .values()
            .find(|(user, _)| user.email.as_ref() == Some(email))
            .map(|(user, _)| user.id.clone()))
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut tables = self.lock(UserPersistenceError::query)?;
        tables.check_unique(user)?;
        let Some((stored, _)) = tables.users.get_mut(&user.id) else {
            return Err(UserPersistenceError::query(format!(
                "user {} no longer exists",
                user.id
            )));
        };
        // Usernames are immutable once registered.
        let username = stored.username.clone();
        *stored = User {
            username,
            ..user.clone()
        };
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<Vec<AssetId>, UserPersistenceError> {
        let mut tables = self.lock(UserPersistenceError::query)?;
        let Some((user, _)) = tables.users.remove(id) else {
            return Ok(Vec::new());
        };
        let mut owned: Vec<&Project> = tables
            .projects
            .values()
            .filter(|project| project.owner == *id)
            .collect();
        owned.sort_by_key(|project| (project.created_at, project.id));
        let owned: Vec<ProjectId> = owned.into_iter().map(|project| project.id).collect();

        let covers: Vec<AssetId> = owned
            .iter()
            .filter_map(|project| tables.projects.get(project)?.cover.clone())
            .collect();
        let images: Vec<AssetId> = owned
            .iter()
            .flat_map(|project| tables.photos_of(project))
            .map(|photo| photo.image.clone())
            .collect();

        tables.photos.retain(|_, photo| !owned.contains(&photo.project_id));
        tables.projects.retain(|_, project| project.owner != *id);

        Ok(user.avatar.into_iter().chain(covers).chain(images).collect())
    }
}

#[async_trait]
impl ProjectRepository for InMemoryRepository {
    async fn list_for_owner(
        &self,
        owner: &UserId,
        offset: u64,
        limit: u64,
    ) -> Result<ProjectPage, ProjectRepositoryError> {
        let tables = self.lock(ProjectRepositoryError::query)?;
        let mut owned: Vec<&Project> = tables
            .projects
            .values()
            .filter(|project| project.is_owned_by(owner))
            .collect();
        owned.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        let total = u64::try_from(owned.len()).unwrap_or(u64::MAX);
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(ProjectPage {
            projects: owned.into_iter().skip(skip).take(take).cloned().collect(),
            total,
        })
    }

    async fn insert(&self, project: &Project) -> Result<(), ProjectRepositoryError> {
        let mut tables = self.lock(ProjectRepositoryError::query)?;
        if !tables.users.contains_key(&project.owner) {
            return Err(ProjectRepositoryError::query(format!(
                "owner {} does not exist",
                project.owner
            )));
        }
        tables.projects.insert(project.id, project.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, ProjectRepositoryError> {
        let tables = self.lock(ProjectRepositoryError::query)?;
        Ok(tables.projects.get(id).cloned())
    }

    async fn update(&self, project: &Project) -> Result<(), ProjectRepositoryError> {
        let mut tables = self.lock(ProjectRepositoryError::query)?;
        match tables.projects.get_mut(&project.id) {
            Some(stored) => {
                *stored = project.clone();
                Ok(())
            }
            None => Err(ProjectRepositoryError::query(format!(
                "project {} no longer exists",
                project.id
            ))),
        }
    }

    async fn delete(&self, id: &ProjectId) -> Result<Vec<AssetId>, ProjectRepositoryError> {
        let mut tables = self.lock(ProjectRepositoryError::query)?;
        let Some(project) = tables.projects.remove(id) else {
            return Ok(Vec::new());
        };
        let images: Vec<AssetId> = tables
            .photos_of(id)
            .into_iter()
            .map(|photo| photo.image.clone())
            .collect();
        tables.photos.retain(|_, photo| photo.project_id != *id);
        Ok(project.cover.into_iter().chain(images).collect())
    }
}

#[async_trait]
impl PhotoRepository for InMemoryRepository {
    async fn next_display_order(&self, project: &ProjectId) -> Result<i32, PhotoRepositoryError> {
        let tables = self.lock(PhotoRepositoryError::query)?;
        Ok(tables
            .photos_of(project)
            .iter()
            .map(|photo| photo.display_order)
            .max()
            .map_or(0, |order| order.saturating_add(1)))
    }

    async fn insert_batch(&self, photos: &[Photo]) -> Result<(), PhotoRepositoryError> {
        let mut tables = self.lock(PhotoRepositoryError::query)?;
        // Validate the whole batch first so a bad row inserts nothing.
        if let Some(orphan) = photos
            .iter()
            .find(|photo| !tables.projects.contains_key(&photo.project_id))
        {
            return Err(PhotoRepositoryError::query(format!(
                "project {} does not exist",
                orphan.project_id
            )));
        }
        for photo in photos {
            tables.photos.insert(photo.id, photo.clone());
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &PhotoId) -> Result<Option<Photo>, PhotoRepositoryError> {
        let tables = self.lock(PhotoRepositoryError::query)?;
        Ok(tables.photos.get(id).cloned())
    }

    async fn list_for_project(
        &self,
        project: &ProjectId,
    ) -> Result<Vec<Photo>, PhotoRepositoryError> {
        let tables = self.lock(PhotoRepositoryError::query)?;
        Ok(tables.photos_of(project).into_iter().cloned().collect())
    }

    async fn update(&self, photo: &Photo) -> Result<(), PhotoRepositoryError> {
        let mut tables = self.lock(PhotoRepositoryError::query)?;
        match tables.photos.get_mut(&photo.id) {
            Some(stored) => {
                *stored = photo.clone();
                Ok(())
            }
            None => Err(PhotoRepositoryError::query(format!(
                "photo {} no longer exists",
                photo.id
            ))),
        }
    }

    async fn delete(&self, id: &PhotoId) -> Result<Option<AssetId>, PhotoRepositoryError> {
        let mut tables = self.lock(PhotoRepositoryError::query)?;
        Ok(tables.photos.remove(id).map(|photo| photo.image))
    }

    async fn delete_many(
        &self,
        project: &ProjectId,
        ids: &[PhotoId],
    ) -> Result<Vec<AssetId>, PhotoRepositoryError> {
        let mut tables = self.lock(PhotoRepositoryError::query)?;
        let mut removed = Vec::new();
        for id in ids {
            let in_project = tables
                .photos
                .get(id)
                .is_some_and(|photo| photo.project_id == *project);
            if !in_project {
                continue;
            }
            if let Some(photo) = tables.photos.remove(id) {
                removed.push(photo.image);
            }
        }
        Ok(removed)
    }

    async fn set_flag(
        &self,
        project: &ProjectId,
        ids: &[PhotoId],
        flag: PhotoFlag,
        value: bool,
    ) -> Result<usize, PhotoRepositoryError> {
        let mut tables = self.lock(PhotoRepositoryError::query)?;
        let now = Utc::now();
        let mut updated = 0;
        for photo in tables
            .photos
            .values_mut()
            .filter(|photo| photo.project_id == *project && ids.contains(&photo.id))
        {
            match flag {
                PhotoFlag::Featured => photo.featured = value,
                PhotoFlag::NeedsAttention => photo.needs_attention = value,
            }
            photo.updated_at = now;
            updated += 1;
        }
        Ok(updated)
    }

    async fn reorder(
        &self,
        project: &ProjectId,
        ordered: &[PhotoId],
    ) -> Result<usize, PhotoRepositoryError> {
        let mut tables = self.lock(PhotoRepositoryError::query)?;
        let mut updated = 0;
        for (index, id) in ordered.iter().enumerate() {
            let position = i32::try_from(index)
                .map_err(|_| PhotoRepositoryError::query("display_order out of range"))?;
            if let Some(photo) = tables
                .photos
                .get_mut(id)
                .filter(|photo| photo.project_id == *project)
            {
                photo.display_order = position;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
