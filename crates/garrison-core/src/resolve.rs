//! Principal resolution: stored credential → [`Resolution`].
//!
//! One resolver serves every account kind; the kind selects the table. The
//! result keeps the reason a credential was rejected so the HTTP boundary
//! can log it before collapsing every non-principal outcome into the same
//! redirect.

use std::sync::Arc;

use strum::Display;

use crate::{
  area::RoleArea,
  principal::{AccountKind, Principal},
  session::{SessionKeys, TokenError},
  store::AccountStore,
};

/// Why a present credential did not yield a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Rejection {
  InvalidToken,
  ExpiredToken,
  PrincipalNotFound,
  /// The principal exists but belongs to another area.
  RoleMismatch,
}

impl From<TokenError> for Rejection {
  fn from(e: TokenError) -> Self {
    match e {
      TokenError::InvalidToken => Rejection::InvalidToken,
      TokenError::ExpiredToken => Rejection::ExpiredToken,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
  /// No credential was presented.
  Anonymous,
  Invalid(Rejection),
  Found(Principal),
}

impl Resolution {
  pub fn principal(self) -> Option<Principal> {
    match self {
      Resolution::Found(p) => Some(p),
      _ => None,
    }
  }
}

pub struct Resolver<S> {
  store: Arc<S>,
  keys:  Arc<SessionKeys>,
}

impl<S> Clone for Resolver<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      keys:  Arc::clone(&self.keys),
    }
  }
}

impl<S: AccountStore> Resolver<S> {
  pub fn new(store: Arc<S>, keys: Arc<SessionKeys>) -> Self { Self { store, keys } }

  /// Resolve `credential` against the table for `kind`.
  ///
  /// Only a storage failure is an error; every authentication failure is a
  /// [`Resolution`] variant.
  pub async fn resolve(
    &self,
    kind: AccountKind,
    credential: Option<&str>,
  ) -> Result<Resolution, S::Error> {
    let Some(token) = credential.map(str::trim).filter(|t| !t.is_empty()) else {
      return Ok(Resolution::Anonymous);
    };

    let claims = match self.keys.verify(token) {
      Ok(claims) => claims,
      Err(e) => return Ok(Resolution::Invalid(e.into())),
    };

    Ok(match self.store.find_principal(kind, claims.sub).await? {
      Some(principal) => Resolution::Found(principal),
      None => Resolution::Invalid(Rejection::PrincipalNotFound),
    })
  }

  /// Resolve for a role area: the principal must also be admitted by it.
  pub async fn resolve_for_area(
    &self,
    area: RoleArea,
    credential: Option<&str>,
  ) -> Result<Resolution, S::Error> {
    Ok(match self.resolve(area.account_kind(), credential).await? {
      Resolution::Found(p) if !area.admits(&p) => {
        Resolution::Invalid(Rejection::RoleMismatch)
      }
      other => other,
    })
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use chrono::{Duration, Utc};
  use uuid::Uuid;

  use super::*;
  use crate::{
    principal::{
      ClientProfile, Credentials, Department, EmployeeProfile, JobTitle, NewAccount,
      UserRole,
    },
    store::Store,
  };

  #[derive(Default)]
  struct MapStore {
    accounts: HashMap<(AccountKind, Uuid), Principal>,
  }

  impl Store for MapStore {
    type Error = std::io::Error;
  }

  impl AccountStore for MapStore {
    async fn add_department(&self, _: String) -> Result<Department, Self::Error> { unimplemented!() }
    async fn add_job_title(&self, _: String) -> Result<JobTitle, Self::Error> { unimplemented!() }
    async fn add_account(&self, _: NewAccount) -> Result<Principal, Self::Error> { unimplemented!() }

    async fn find_principal(
      &self,
      kind: AccountKind,
      id: Uuid,
    ) -> Result<Option<Principal>, Self::Error> {
      Ok(self.accounts.get(&(kind, id)).cloned())
    }

    async fn find_credentials(
      &self,
      _: AccountKind,
      _: &str,
    ) -> Result<Option<Credentials>, Self::Error> {
      unimplemented!()
    }
  }

  fn keys() -> Arc<SessionKeys> { Arc::new(SessionKeys::from_secret(b"resolver-secret")) }

  fn client(id: Uuid) -> Principal {
    Principal::Client(ClientProfile {
      client_id: id,
      name:      "Harbour Mall".into(),
      email:     "facilities@harbour.test".into(),
      company:   Some("Harbour Holdings".into()),
    })
  }

  fn employee(id: Uuid, role: UserRole) -> Principal {
    Principal::Employee(EmployeeProfile {
      user_id:    id,
      name:       "Sam Okafor".into(),
      email:      "sam@garrison.test".into(),
      role,
      department: None,
      job_title:  None,
      branch_id:  None,
    })
  }

  fn resolver_with(entries: Vec<(AccountKind, Principal)>) -> Resolver<MapStore> {
    let mut store = MapStore::default();
    for (kind, p) in entries {
      store.accounts.insert((kind, p.id()), p);
    }
    Resolver::new(Arc::new(store), keys())
  }

  #[tokio::test]
  async fn missing_credential_is_anonymous() {
    let r = resolver_with(vec![]);
    assert_eq!(r.resolve(AccountKind::Client, None).await.unwrap(), Resolution::Anonymous);
    assert_eq!(
      r.resolve(AccountKind::Client, Some("  ")).await.unwrap(),
      Resolution::Anonymous
    );
  }

  #[tokio::test]
  async fn valid_credential_resolves_principal() {
    let id    = Uuid::new_v4();
    let r     = resolver_with(vec![(AccountKind::Client, client(id))]);
    let token = keys().issue(id, Duration::hours(1)).unwrap();
    let res   = r.resolve(AccountKind::Client, Some(token.as_str())).await.unwrap();
    assert_eq!(res, Resolution::Found(client(id)));
  }

  #[tokio::test]
  async fn lookup_uses_the_requested_table() {
    let id    = Uuid::new_v4();
    let r     = resolver_with(vec![(AccountKind::Client, client(id))]);
    let token = keys().issue(id, Duration::hours(1)).unwrap();
    let res   = r.resolve(AccountKind::Supplier, Some(token.as_str())).await.unwrap();
    assert_eq!(res, Resolution::Invalid(Rejection::PrincipalNotFound));
  }

  #[tokio::test]
  async fn bad_and_expired_credentials_keep_their_reason() {
    let id = Uuid::new_v4();
    let r  = resolver_with(vec![(AccountKind::Client, client(id))]);

    let expired = keys()
      .issue_at(id, Utc::now() - Duration::days(2), Duration::days(1))
      .unwrap();
    assert_eq!(
      r.resolve(AccountKind::Client, Some(expired.as_str())).await.unwrap(),
      Resolution::Invalid(Rejection::ExpiredToken)
    );
    assert_eq!(
      r.resolve(AccountKind::Client, Some("abc.def.ghi")).await.unwrap(),
      Resolution::Invalid(Rejection::InvalidToken)
    );
  }

  #[tokio::test]
  async fn area_resolution_checks_grade() {
    let id    = Uuid::new_v4();
    let r     = resolver_with(vec![(AccountKind::User, employee(id, UserRole::Employee))]);
    let token = keys().issue(id, Duration::hours(1)).unwrap();

    let ok = r.resolve_for_area(RoleArea::Employee, Some(token.as_str())).await.unwrap();
    assert!(ok.principal().is_some());

    let head = r.resolve_for_area(RoleArea::Head, Some(token.as_str())).await.unwrap();
    assert_eq!(head, Resolution::Invalid(Rejection::RoleMismatch));
  }

  #[tokio::test]
  async fn resolution_is_repeatable() {
    let id    = Uuid::new_v4();
    let r     = resolver_with(vec![(AccountKind::Client, client(id))]);
    let token = keys().issue(id, Duration::hours(1)).unwrap();
    let first  = r.resolve(AccountKind::Client, Some(token.as_str())).await.unwrap();
    let second = r.resolve(AccountKind::Client, Some(token.as_str())).await.unwrap();
    assert_eq!(first, second);
  }
}
