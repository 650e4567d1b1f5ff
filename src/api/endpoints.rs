//! 백엔드 엔드포인트 경로 모음.
//! 경로 파라미터가 있는 엔드포인트는 함수로 만듭니다.

pub mod auth {
    pub const REGISTER: &str = "/api/auth/register";
    pub const LOGIN: &str = "/api/auth/login";
    pub const LOGOUT: &str = "/api/auth/logout";
    pub const ME: &str = "/api/auth/me";
}

pub mod documents {
    pub const LIST: &str = "/api/documents";
    pub const CREATE: &str = "/api/documents";
    pub const GENERATE: &str = "/api/documents/generate";
    pub const UPDATE_WITH_AGENT: &str = "/api/documents/update";

    pub fn get(id: &str) -> String {
        format!("/api/documents/{}", id)
    }

    pub fn audit(id: &str) -> String {
        format!("/api/documents/{}/audit", id)
    }

    pub fn versions(id: &str) -> String {
        format!("/api/documents/{}/versions", id)
    }

    pub fn version(id: &str, version_number: i64) -> String {
        format!("/api/documents/{}/versions/{}", id, version_number)
    }
}

pub mod embeddings {
    pub const CREATE: &str = "/api/embeddings/create";
    pub const SEARCH: &str = "/api/embeddings/search";

    /// 조회(GET)와 삭제(DELETE)가 같은 경로를 씁니다.
    pub fn by_document(doc_id: &str) -> String {
        format!("/api/embeddings/doc/{}", doc_id)
    }
}
