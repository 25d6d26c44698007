use uuid::Uuid;

// Framework-free authorization core. Nothing in this module touches HTTP types;
// the gate translates its decisions at the boundary.

/// Identity
///
/// The minimal projection of a registered user that authorization decisions need:
/// who they are and whether they carry the admin flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub admin: bool,
}

/// Principal
///
/// The subject of an authorization decision: either a resolved identity or nobody.
/// Public reads are decided without ever resolving an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    Anonymous,
    Known(Identity),
}

/// OperationKind
///
/// Every operation the API exposes, named by what it does. The classification
/// methods below drive the rule table; adding an endpoint means adding a variant
/// and classifying it, not editing the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    // Public reads.
    ListCampsites,
    GetCampsite,
    ListComments,
    GetComment,
    ListPromotions,
    GetPromotion,
    ListPartners,
    GetPartner,

    // Any authenticated user.
    ViewProfile,
    AddComment,

    // Scoped to the resource owner.
    EditComment,
    RemoveComment,

    // Admin only.
    CreateCampsite,
    UpdateCampsite,
    RemoveCampsite,
    ClearCampsites,
    ClearComments,
    RemoveAnyComment,
    CreatePromotion,
    UpdatePromotion,
    RemovePromotion,
    CreatePartner,
    UpdatePartner,
    RemovePartner,
    UploadImage,
    ListUsers,
}

impl OperationKind {
    /// True for read-only operations over public resources; these never require
    /// an identity.
    pub fn is_public_read(self) -> bool {
        matches!(
            self,
            Self::ListCampsites
                | Self::GetCampsite
                | Self::ListComments
                | Self::GetComment
                | Self::ListPromotions
                | Self::GetPromotion
                | Self::ListPartners
                | Self::GetPartner
        )
    }

    /// True for operations reserved to administrators.
    pub fn requires_admin(self) -> bool {
        matches!(
            self,
            Self::CreateCampsite
                | Self::UpdateCampsite
                | Self::RemoveCampsite
                | Self::ClearCampsites
                | Self::ClearComments
                | Self::RemoveAnyComment
                | Self::CreatePromotion
                | Self::UpdatePromotion
                | Self::RemovePromotion
                | Self::CreatePartner
                | Self::UpdatePartner
                | Self::RemovePartner
                | Self::UploadImage
                | Self::ListUsers
        )
    }

    /// True for mutations of a resource that belongs to a specific identity.
    pub fn checks_ownership(self) -> bool {
        matches!(self, Self::EditComment | Self::RemoveComment)
    }
}

/// Operation
///
/// A requested operation plus the ownership fact needed to decide it. The owner
/// reference is only consulted for ownership-scoped kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub kind: OperationKind,
    pub resource_owner: Option<Uuid>,
}

impl Operation {
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            resource_owner: None,
        }
    }

    pub fn owned(kind: OperationKind, owner: Uuid) -> Self {
        Self {
            kind,
            resource_owner: Some(owner),
        }
    }
}

/// DenyReason
///
/// Why an operation was refused. Each reason maps to a distinct, user-visible
/// status at the boundary, which is why rule precedence matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    Forbidden,
    NotOwner,
}

/// Decision
///
/// The transient outcome of a policy evaluation. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// authorize
///
/// The ordered rule table. First match wins, and the precedence is load-bearing:
/// the authentication check strictly precedes the admin check, which strictly
/// precedes the ownership check, because each failure surfaces a different status.
///
/// 1. Public reads are allowed unconditionally.
/// 2. Anonymous callers are refused everything else.
/// 3. Admin-reserved operations refuse non-admin identities.
/// 4. Ownership-scoped operations refuse identities that do not own the resource.
/// 5. Everything remaining is allowed.
pub fn authorize(principal: Principal, operation: &Operation) -> Decision {
    if operation.kind.is_public_read() {
        return Decision::Allow;
    }

    let identity = match principal {
        Principal::Anonymous => return Decision::Deny(DenyReason::Unauthenticated),
        Principal::Known(identity) => identity,
    };

    if operation.kind.requires_admin() && !identity.admin {
        return Decision::Deny(DenyReason::Forbidden);
    }

    if operation.kind.checks_ownership() && operation.resource_owner != Some(identity.id) {
        return Decision::Deny(DenyReason::NotOwner);
    }

    Decision::Allow
}
