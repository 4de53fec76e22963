pub mod auth;

pub use auth::{
    AccountInfo, AuthPayload, ChallengeInfo, LoginRequest, LoginVerifyRequest, RefreshRequest,
    RegisterRequest, RegisterVerifyRequest, TokenPairInfo,
};
