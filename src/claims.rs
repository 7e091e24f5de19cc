// src/claims.rs

//! Reference data for the claims an OAuth 2.0 / OIDC token may carry.

use crate::validator::TokenType;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Documentation for a registered claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimDescription {
    pub name: &'static str,
    pub description: &'static str,
    /// The document that defines the claim.
    pub specification: &'static str,
    pub required: bool,
    /// The token types the claim is defined for.
    pub token_types: &'static [TokenType],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<&'static str>,
}

/// A claim that only a particular identity provider emits, or that it uses in its own way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderClaim {
    pub name: &'static str,
    pub description: &'static str,
    pub provider: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<&'static str>,
}

/// Common OIDC claims, in the order they are listed before any other claim.
pub const STANDARD_CLAIMS: &[&str] = &[
    "iss", "sub", "aud", "exp", "iat", "auth_time", "nonce", "acr", "amr", "azp", "at_hash", "c_hash",
];

/// Claims whose value is a UNIX timestamp.
pub const TIMESTAMP_CLAIMS: &[&str] = &["exp", "iat", "auth_time", "nbf"];

static CLAIM_DESCRIPTIONS: &[ClaimDescription] = &[
    ClaimDescription {
        name: "iss",
        description: "Issuer Identifier - identifies the principal that issued the token",
        specification: "OIDC Core",
        required: true,
        token_types: &[TokenType::IdToken, TokenType::AccessToken, TokenType::RefreshToken],
        format: Some("URL"),
        example: Some("https://auth.example.com"),
    },
    ClaimDescription {
        name: "sub",
        description: "Subject Identifier - identifies the principal that is the subject of the token",
        specification: "OIDC Core",
        required: true,
        token_types: &[TokenType::IdToken, TokenType::AccessToken],
        format: None,
        example: Some("24400320"),
    },
    ClaimDescription {
        name: "aud",
        description: "Audience - identifies the recipient(s) for which the token is intended",
        specification: "OIDC Core",
        required: true,
        token_types: &[TokenType::IdToken, TokenType::AccessToken],
        format: None,
        example: Some("s6BhdRkqt3"),
    },
    ClaimDescription {
        name: "exp",
        description: "Expiration Time - identifies the expiration time of the token",
        specification: "OIDC Core",
        required: true,
        token_types: &[TokenType::IdToken, TokenType::AccessToken, TokenType::RefreshToken],
        format: Some("UNIX timestamp"),
        example: Some("1311281970"),
    },
    ClaimDescription {
        name: "iat",
        description: "Issued At - identifies the time at which the token was issued",
        specification: "OIDC Core",
        required: true,
        token_types: &[TokenType::IdToken, TokenType::AccessToken, TokenType::RefreshToken],
        format: Some("UNIX timestamp"),
        example: Some("1311280970"),
    },
    ClaimDescription {
        name: "auth_time",
        description: "Time when authentication occurred",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: Some("UNIX timestamp"),
        example: Some("1311280969"),
    },
    ClaimDescription {
        name: "nonce",
        description: "String value used to associate a client session with an ID Token (mitigates replay attacks)",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: None,
        example: Some("n-0S6_WzA2Mj"),
    },
    ClaimDescription {
        name: "acr",
        description: "Authentication Context Class Reference - level of authentication/assurance",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: None,
        example: Some("urn:mace:incommon:iap:silver"),
    },
    ClaimDescription {
        name: "amr",
        description: "Authentication Methods References - methods used for authentication",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: Some("Array of strings"),
        example: Some("[\"pwd\",\"otp\"]"),
    },
    ClaimDescription {
        name: "azp",
        description: "Authorized Party - the party to which the token was issued",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken, TokenType::AccessToken],
        format: None,
        example: Some("s6BhdRkqt3"),
    },
    ClaimDescription {
        name: "at_hash",
        description: "Access Token hash value - provides validation of the access token",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: None,
        example: Some("MTIzNDU2Nzg5MDEyMzQ1Ng"),
    },
    ClaimDescription {
        name: "c_hash",
        description: "Code hash value - provides validation of the authorization code",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: None,
        example: Some("LDktKdoQak3Pk0cnXxCltA"),
    },
    ClaimDescription {
        name: "scope",
        description: "OAuth 2.0 scopes that the client has been granted",
        specification: "OAuth 2.0",
        required: false,
        token_types: &[TokenType::AccessToken],
        format: Some("Space-delimited string"),
        example: Some("openid profile email"),
    },
    ClaimDescription {
        name: "scp",
        description: "Alternative representation of scopes (used by some providers)",
        specification: "Vendor-specific",
        required: false,
        token_types: &[TokenType::AccessToken],
        format: Some("Array of strings"),
        example: Some("[\"openid\",\"profile\",\"email\"]"),
    },
    ClaimDescription {
        name: "client_id",
        description: "OAuth 2.0 client identifier",
        specification: "OAuth 2.0",
        required: false,
        token_types: &[TokenType::AccessToken, TokenType::RefreshToken],
        format: None,
        example: Some("s6BhdRkqt3"),
    },
    ClaimDescription {
        name: "jti",
        description: "JWT ID - provides a unique identifier for the token",
        specification: "JWT",
        required: false,
        token_types: &[TokenType::IdToken, TokenType::AccessToken, TokenType::RefreshToken],
        format: None,
        example: Some("id12342"),
    },
    ClaimDescription {
        name: "sid",
        description: "Session ID - identifies the end-user's session",
        specification: "OIDC Session Management",
        required: false,
        token_types: &[TokenType::IdToken],
        format: None,
        example: Some("08a5019c-17e1-4977-8f42-65a12843ea02"),
    },
    ClaimDescription {
        name: "nbf",
        description: "Not Before - identifies the time before which the token must not be accepted",
        specification: "JWT",
        required: false,
        token_types: &[TokenType::IdToken, TokenType::AccessToken, TokenType::RefreshToken],
        format: Some("UNIX timestamp"),
        example: Some("1311280970"),
    },
    ClaimDescription {
        name: "name",
        description: "End-User's full name",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: None,
        example: Some("John Doe"),
    },
    ClaimDescription {
        name: "given_name",
        description: "End-User's given name(s) or first name(s)",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: None,
        example: Some("John"),
    },
    ClaimDescription {
        name: "family_name",
        description: "End-User's surname(s) or last name(s)",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: None,
        example: Some("Doe"),
    },
    ClaimDescription {
        name: "email",
        description: "End-User's email address",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: None,
        example: Some("john.doe@example.com"),
    },
    ClaimDescription {
        name: "email_verified",
        description: "True if the End-User's email address has been verified",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: Some("Boolean"),
        example: Some("true"),
    },
    ClaimDescription {
        name: "middle_name",
        description: "End-User's middle name(s)",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: None,
        example: Some("William"),
    },
    ClaimDescription {
        name: "nickname",
        description: "Casual name of the End-User",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: None,
        example: Some("Bill"),
    },
    ClaimDescription {
        name: "preferred_username",
        description: "Shorthand name by which the End-User wishes to be referred to",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: None,
        example: Some("billdoe"),
    },
    ClaimDescription {
        name: "profile",
        description: "URL of the End-User's profile page",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: Some("URL"),
        example: Some("https://example.com/profile/johndoe"),
    },
    ClaimDescription {
        name: "picture",
        description: "URL of the End-User's profile picture",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: Some("URL"),
        example: Some("https://example.com/photos/johndoe.jpg"),
    },
    ClaimDescription {
        name: "website",
        description: "URL of the End-User's web page or blog",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: Some("URL"),
        example: Some("https://johndoe.blog.example.com"),
    },
    ClaimDescription {
        name: "gender",
        description: "End-User's gender",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: None,
        example: Some("female"),
    },
    ClaimDescription {
        name: "birthdate",
        description: "End-User's birthday",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: Some("ISO 8601:2004 YYYY-MM-DD format"),
        example: Some("1980-01-15"),
    },
    ClaimDescription {
        name: "zoneinfo",
        description: "String from zoneinfo time zone database",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: None,
        example: Some("America/Los_Angeles"),
    },
    ClaimDescription {
        name: "locale",
        description: "End-User's locale",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: Some("RFC 5646 language tag"),
        example: Some("en-US"),
    },
    ClaimDescription {
        name: "phone_number",
        description: "End-User's preferred telephone number",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: Some("E.164 format"),
        example: Some("+1 (425) 555-1212"),
    },
    ClaimDescription {
        name: "phone_number_verified",
        description: "True if the End-User's phone number has been verified",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: Some("Boolean"),
        example: Some("true"),
    },
    ClaimDescription {
        name: "address",
        description: "End-User's preferred postal address",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: Some("JSON object"),
        example: Some("{ \"street_address\": \"123 Main St\", \"locality\": \"Anytown\", \"region\": \"Anystate\", \"postal_code\": \"12345\", \"country\": \"US\" }"),
    },
    ClaimDescription {
        name: "updated_at",
        description: "Time when the End-User's information was last updated",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: Some("UNIX timestamp"),
        example: Some("1311280970"),
    },
    ClaimDescription {
        name: "sub_jwk",
        description: "Public key used to check the signature of an ID Token",
        specification: "OIDC Core",
        required: false,
        token_types: &[TokenType::IdToken],
        format: Some("JWK"),
        example: Some("{ \"kty\": \"RSA\", \"n\": \"...\", \"e\": \"AQAB\" }"),
    },
    ClaimDescription {
        name: "cnf",
        description: "Confirmation - contains members that confirm the keys",
        specification: "RFC 7800",
        required: false,
        token_types: &[TokenType::AccessToken],
        format: Some("JSON object"),
        example: Some("{ \"jwk\": { \"kty\": \"RSA\", \"n\": \"...\", \"e\": \"AQAB\" } }"),
    },
    ClaimDescription {
        name: "events",
        description: "Security Events",
        specification: "RFC 8417",
        required: false,
        token_types: &[TokenType::IdToken, TokenType::AccessToken],
        format: Some("JSON object"),
        example: Some("{ \"https://example.org/events/accountEnabled\": {} }"),
    },
    ClaimDescription {
        name: "toe",
        description: "Time of Event",
        specification: "RFC 8417",
        required: false,
        token_types: &[TokenType::IdToken, TokenType::AccessToken],
        format: Some("UNIX timestamp"),
        example: Some("1311280970"),
    },
    ClaimDescription {
        name: "txn",
        description: "Transaction Identifier",
        specification: "RFC 8417",
        required: false,
        token_types: &[TokenType::IdToken, TokenType::AccessToken],
        format: None,
        example: Some("transaction-12345"),
    },
    ClaimDescription {
        name: "vot",
        description: "Vector of Trust value",
        specification: "RFC 8485",
        required: false,
        token_types: &[TokenType::IdToken],
        format: None,
        example: Some("P1.Cc.Ac"),
    },
    ClaimDescription {
        name: "vtm",
        description: "Vector of Trust trustmark URL",
        specification: "RFC 8485",
        required: false,
        token_types: &[TokenType::IdToken],
        format: Some("URL"),
        example: Some("https://example.org/trustmark/2018"),
    },
    ClaimDescription {
        name: "act",
        description: "Actor - identifies the subject that is acting on behalf of the JWT's subject",
        specification: "RFC 8693",
        required: false,
        token_types: &[TokenType::AccessToken],
        format: Some("JSON object"),
        example: Some("{ \"sub\": \"user123\" }"),
    },
    ClaimDescription {
        name: "may_act",
        description: "Authorized Actor - the party that is authorized to become the actor",
        specification: "RFC 8693",
        required: false,
        token_types: &[TokenType::AccessToken],
        format: Some("JSON object"),
        example: Some("{ \"sub\": \"agent123\" }"),
    },
    ClaimDescription {
        name: "roles",
        description: "Roles assigned to the subject",
        specification: "RFC 9068",
        required: false,
        token_types: &[TokenType::AccessToken],
        format: Some("Array of strings"),
        example: Some("[\"admin\", \"user\"]"),
    },
    ClaimDescription {
        name: "groups",
        description: "Groups that the subject belongs to",
        specification: "RFC 9068",
        required: false,
        token_types: &[TokenType::AccessToken, TokenType::IdToken],
        format: Some("Array of strings"),
        example: Some("[\"admins\", \"developers\"]"),
    },
    ClaimDescription {
        name: "entitlements",
        description: "Entitlements granted to the subject",
        specification: "RFC 9068",
        required: false,
        token_types: &[TokenType::AccessToken],
        format: Some("Array of strings"),
        example: Some("[\"read:user\", \"write:user\"]"),
    },
    ClaimDescription {
        name: "token_introspection",
        description: "Token introspection response",
        specification: "RFC 9701",
        required: false,
        token_types: &[TokenType::AccessToken],
        format: Some("JSON object"),
        example: Some("{ \"active\": true }"),
    },
    ClaimDescription {
        name: "htm",
        description: "The HTTP method of the request",
        specification: "OAuth 2.0 Demonstration of Proof-of-Possession",
        required: false,
        token_types: &[TokenType::AccessToken],
        format: None,
        example: Some("POST"),
    },
    ClaimDescription {
        name: "htu",
        description: "The HTTP URI of the request (without query and fragment parts)",
        specification: "OAuth 2.0 Demonstration of Proof-of-Possession",
        required: false,
        token_types: &[TokenType::AccessToken],
        format: Some("URL"),
        example: Some("https://api.example.com/resource"),
    },
    ClaimDescription {
        name: "verified_claims",
        description: "A structured claim containing end-user claims and how they were assured",
        specification: "OpenID Identity Assurance",
        required: false,
        token_types: &[TokenType::IdToken],
        format: Some("JSON object"),
        example: Some("{ \"verification\": { \"trust_framework\": \"eidas\" }, \"claims\": { \"given_name\": \"John\" } }"),
    },
    ClaimDescription {
        name: "nationalities",
        description: "String array representing the end-user's nationalities",
        specification: "OpenID Identity Assurance",
        required: false,
        token_types: &[TokenType::IdToken],
        format: Some("Array of strings"),
        example: Some("[\"US\", \"UK\"]"),
    },
    ClaimDescription {
        name: "birth_family_name",
        description: "Family name(s) someone has when they were born or as a child",
        specification: "OpenID Identity Assurance",
        required: false,
        token_types: &[TokenType::IdToken],
        format: None,
        example: Some("Smith"),
    },
    ClaimDescription {
        name: "birth_given_name",
        description: "Given name(s) someone has when they were born or as a child",
        specification: "OpenID Identity Assurance",
        required: false,
        token_types: &[TokenType::IdToken],
        format: None,
        example: Some("James"),
    },
    ClaimDescription {
        name: "place_of_birth",
        description: "A structured claim representing the end-user's place of birth",
        specification: "OpenID Identity Assurance",
        required: false,
        token_types: &[TokenType::IdToken],
        format: Some("JSON object"),
        example: Some("{ \"country\": \"US\", \"locality\": \"Los Angeles\", \"region\": \"CA\" }"),
    },
    ClaimDescription {
        name: "authorization_details",
        description: "Contains details about the authorization, including rights of the access token",
        specification: "RFC 9396",
        required: false,
        token_types: &[TokenType::AccessToken],
        format: Some("JSON array of objects"),
        example: Some("[{ \"type\": \"account_information\", \"actions\": [\"read\"] }]"),
    },
];

static PROVIDER_CLAIMS: &[ProviderClaim] = &[
    ProviderClaim {
        name: "tid",
        description: "Tenant ID - Represents the Azure AD tenant that the user belongs to",
        provider: "Microsoft Azure AD",
        format: None,
        example: Some("72f988bf-86f1-41af-91ab-2d7cd011db47"),
    },
    ProviderClaim {
        name: "preferred_username",
        description: "The username that the end user prefers to be referred to as",
        provider: "Microsoft Azure AD",
        format: None,
        example: Some("john.doe@example.com"),
    },
    ProviderClaim {
        name: "roles",
        description: "Array of app roles the user is assigned to",
        provider: "Microsoft Azure AD",
        format: Some("Array of strings"),
        example: Some("[\"Admin\", \"User\"]"),
    },
    ProviderClaim {
        name: "groups",
        description: "Groups that the user belongs to",
        provider: "Microsoft Azure AD",
        format: Some("Array of strings"),
        example: Some("[\"group1\", \"group2\"]"),
    },
    ProviderClaim {
        name: "ver",
        description: "Version number - indicates the version of the token",
        provider: "Microsoft Azure AD",
        format: None,
        example: Some("2.0"),
    },
    ProviderClaim {
        name: "nickname",
        description: "Casual name of the user",
        provider: "Auth0",
        format: None,
        example: Some("johnny"),
    },
    ProviderClaim {
        name: "picture",
        description: "URL of user profile picture",
        provider: "Auth0",
        format: None,
        example: Some("https://example.com/johndoe.png"),
    },
    ProviderClaim {
        name: "updated_at",
        description: "Time the user's information was last updated",
        provider: "Auth0",
        format: None,
        example: Some("2020-01-01T00:00:00.000Z"),
    },
    ProviderClaim {
        name: "https://example.com/roles",
        description: "Custom namespace claim for roles",
        provider: "Auth0",
        format: Some("Array of strings"),
        example: Some("[\"admin\", \"editor\"]"),
    },
    ProviderClaim {
        name: "https://example.com/permissions",
        description: "Custom namespace claim for permissions",
        provider: "Auth0",
        format: Some("Array of strings"),
        example: Some("[\"read:users\", \"write:users\"]"),
    },
    ProviderClaim {
        name: "ver",
        description: "Version of the Okta ID token",
        provider: "Okta",
        format: None,
        example: Some("1.0"),
    },
    ProviderClaim {
        name: "groups",
        description: "Groups that the user belongs to",
        provider: "Okta",
        format: Some("Array of strings"),
        example: Some("[\"Everyone\", \"Admins\"]"),
    },
    ProviderClaim {
        name: "hd",
        description: "G Suite domain - hosted domain parameter",
        provider: "Google",
        format: None,
        example: Some("example.com"),
    },
    ProviderClaim {
        name: "locale",
        description: "User's locale/language preference",
        provider: "Google",
        format: None,
        example: Some("en-US"),
    },
    ProviderClaim {
        name: "picture",
        description: "URL of user profile picture",
        provider: "Google",
        format: None,
        example: Some("https://lh3.googleusercontent.com/a/...s96-c"),
    },
    ProviderClaim {
        name: "cognito:username",
        description: "User's Cognito username",
        provider: "AWS Cognito",
        format: None,
        example: Some("johndoe"),
    },
    ProviderClaim {
        name: "identities",
        description: "User's identity information in identity pools",
        provider: "AWS Cognito",
        format: Some("JSON array"),
        example: Some("[{\"userId\":\"...\",\"providerName\":\"...\"}]"),
    },
    ProviderClaim {
        name: "cognito:groups",
        description: "Groups that the user belongs to",
        provider: "AWS Cognito",
        format: Some("Array of strings"),
        example: Some("[\"admin\", \"standard-users\"]"),
    },
];

static DESCRIPTION_INDEX: Lazy<HashMap<&'static str, &'static ClaimDescription>> =
    Lazy::new(|| CLAIM_DESCRIPTIONS.iter().map(|d| (d.name, d)).collect());

/// Looks up the registered description of a claim.
pub fn claim_description(name: &str) -> Option<&'static ClaimDescription> {
    DESCRIPTION_INDEX.get(name).copied()
}

/// All registered claim descriptions.
pub fn all_claim_descriptions() -> &'static [ClaimDescription] {
    CLAIM_DESCRIPTIONS
}

/// Every provider note for a claim name, in registry order.
pub fn provider_claims(name: &str) -> Vec<&'static ProviderClaim> {
    PROVIDER_CLAIMS.iter().filter(|c| c.name == name).collect()
}

pub fn all_provider_claims() -> &'static [ProviderClaim] {
    PROVIDER_CLAIMS
}
