use application::transfer::GetProfileByUsernameDto;

use crate::controller::Intake;

#[derive(Debug)]
pub struct GetRequest {
    username: String,
}

impl GetRequest {
    pub fn new(username: String) -> Self {
        Self { username }
    }
}

pub struct Transformer;

impl Intake<GetRequest> for Transformer {
    type To = GetProfileByUsernameDto;
    fn emit(&self, input: GetRequest) -> Self::To {
        GetProfileByUsernameDto {
            username: input.username,
        }
    }
}
