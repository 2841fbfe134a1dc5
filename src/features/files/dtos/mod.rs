mod file_dto;

pub use file_dto::{
    DeleteFileResponseDto, FileResponseDto, OwnerDto, ShareEntryDto, ShareFileDto,
    UpdateTextContentDto, UploadFileDto, MAX_FILE_SIZE,
};
