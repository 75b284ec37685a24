use gpui::actions;

actions!(
    annotator,
    [
        About,
        ExportHtml,
        NewFile,
        OpenFile,
        OpenRepository,
        Quit,
        ResetSplit,
        SaveFile,
        TogglePreview,
        ToggleWordWrap,
    ]
);
